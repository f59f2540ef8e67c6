//! End-of-run statistics logging.

use log::info;

use crate::error_handling::ProcessingStats;

/// Logs the non-zero transient failure counters.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    if total_errors == 0 {
        info!("No transient failures recorded");
        return;
    }

    info!("Transient failure counts ({} total):", total_errors);
    for (error_type, count) in error_stats.snapshot() {
        if count > 0 {
            info!("   {}: {}", error_type.as_ref(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorType;

    #[test]
    fn test_print_error_statistics_no_errors() {
        print_error_statistics(&ProcessingStats::new());
    }

    #[test]
    fn test_print_error_statistics_with_errors() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::ProbeTimeout);
        stats.increment_error(ErrorType::NotifierDropped);
        print_error_statistics(&stats);
        assert_eq!(stats.total_errors(), 2);
    }
}
