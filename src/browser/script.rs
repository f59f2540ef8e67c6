//! Search automation scripts.
//!
//! Each provider has a fixed script with a single query slot. The query is
//! rendered as a JSON string literal before substitution, so quotes,
//! backslashes and line breaks can never close the literal early.

use super::SearchProvider;

/// Marks the one position where the quoted query is substituted.
const QUERY_SLOT: &str = "__QUERY_LITERAL__";

const PRIMARY_SCRIPT: &str = r#"
module.exports = async ({ page }) => {
    await page.goto("https://www.google.com", { waitUntil: "domcontentloaded" });

    try {
        await page.click('button[id="L2AGLb"]', { timeout: 3000 });
    } catch (e) {}

    const query = __QUERY_LITERAL__;
    await page.focus("textarea[name='q'], input[name='q']");
    for (const ch of query) {
        await page.keyboard.type(ch);
        await new Promise((r) => setTimeout(r, 100 + Math.random() * 200));
    }
    await page.keyboard.press("Enter");

    await page.waitForSelector("h3", { timeout: 10000 });

    const results = await page.evaluate(() => {
        return Array.from(document.querySelectorAll("h3"))
            .slice(0, 10)
            .map((el) => {
                const link = el.closest("a");
                return { title: el.innerText, url: link ? link.href : null };
            })
            .filter((result) => result.url);
    });

    return JSON.stringify(results);
};
"#;

const SECONDARY_SCRIPT: &str = r#"
module.exports = async ({ page }) => {
    await page.goto("https://duckduckgo.com", { waitUntil: "domcontentloaded" });

    const query = __QUERY_LITERAL__;
    await page.type("input[name='q']", query);
    await new Promise((r) => setTimeout(r, 1000));
    await page.keyboard.press("Enter");

    await page.waitForSelector("h2 a", { timeout: 10000 });

    const results = await page.evaluate(() => {
        return Array.from(document.querySelectorAll("h2 a"))
            .slice(0, 10)
            .map((el) => ({ title: el.innerText, url: el.href }))
            .filter((result) => result.url);
    });

    return JSON.stringify(results);
};
"#;

/// Quotes `query` as a JavaScript string literal.
///
/// JSON string syntax is valid JavaScript; U+2028 and U+2029 are escaped as
/// well because older engines treat them as line terminators inside literals.
pub fn js_string_literal(query: &str) -> String {
    let quoted = serde_json::Value::String(query.to_string()).to_string();
    quoted
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Builds the automation script for `provider` with `query` substituted.
pub fn build_search_script(provider: SearchProvider, query: &str) -> String {
    let template = match provider {
        SearchProvider::Primary => PRIMARY_SCRIPT,
        SearchProvider::Secondary => SECONDARY_SCRIPT,
    };
    template.replacen(QUERY_SLOT, &js_string_literal(query), 1)
}
