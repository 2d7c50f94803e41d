#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut lexer = tomltree::Lexer::new(s);
        let mut end = None;
        for tok in lexer.by_ref() {
            if let Some(end) = end {
                assert_eq!(tok.span.start, end);
            }
            assert!(tok.span.end > tok.span.start);
            end = Some(tok.span.end);
        }
        assert_eq!(lexer.modes().first(), Some(&tomltree::Mode::Top));
        if let Some(end) = end {
            assert_eq!(end, s.len());
        }
    }
});
