#![no_main]
use libfuzzer_sys::fuzz_target;

use autos_tracker::domain::card::DetailPage;
use autos_tracker::domain::listing::Listing;

// Input is read as alternating label/value lines; the whole input is also the body text.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let lines: Vec<&str> = text.lines().collect();
        let labels = lines
            .chunks(2)
            .filter_map(|pair| match pair {
                [label, value] => Some(((*label).to_string(), (*value).to_string())),
                _ => None,
            })
            .collect();
        let detail = DetailPage {
            labels,
            body_text: text.to_string(),
        };
        let mut listing = Listing::new("1", "https://ecaytrade.com/advert/1");
        autos_tracker::extract::reconcile::reconcile(&mut listing, &detail);
    }
});
