#![no_main]
use libfuzzer_sys::fuzz_target;

use autos_tracker::adapters::html::parser;

fuzz_target!(|data: &[u8]| {
    if let Ok(html) = std::str::from_utf8(data) {
        let Ok(page_url) = url::Url::parse("https://ecaytrade.com/autos-boats/autos?minprice=4000")
        else {
            return;
        };
        let _ = parser::parse_cards(html, &page_url);
        let _ = parser::has_next_page(html, &page_url, 1);
        let _ = parser::parse_detail(html);
    }
});
