#![no_main]
use libfuzzer_sys::fuzz_target;

use autos_tracker::domain::acceptance::AcceptanceRules;
use autos_tracker::domain::card::RawCard;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let card = RawCard::new("https://ecaytrade.com/advert/1", text);
        if let Ok(listing) = autos_tracker::extract::parse_card(&card) {
            let _ = AcceptanceRules::new(4000.0).check(&listing);
        }
    }
});
