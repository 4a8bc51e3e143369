//! Fuzz target: `Key` byte storage
//!
//! Feeds arbitrary type tags and byte strings through `Key::with_data`,
//! `set_data` and `set_type`, verifying:
//! - No panics under any byte sequence
//! - Data longer than `KEY_MAX_SIZE` is rejected and leaves the key intact
//! - Accepted data is stored verbatim and zero-filled to the buffer end
//! - `payload()` is always the type-sized prefix of `data()`
//!
//! cargo fuzz run fuzz_key_data

#![no_main]

use ibutton_worker::key::{KEY_MAX_SIZE, Key, KeyType};
use libfuzzer_sys::fuzz_target;

fn key_type(tag: u8) -> KeyType {
    match tag % 3 {
        0 => KeyType::Dallas,
        1 => KeyType::Cyfral,
        _ => KeyType::Metakom,
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&tag, rest)) = data.split_first() else {
        return;
    };

    let mut key = Key::new(key_type(tag));
    let before = key;

    match key.set_data(rest) {
        Ok(()) => {
            assert!(rest.len() <= KEY_MAX_SIZE);
            assert_eq!(&key.data()[..rest.len()], rest);
            assert!(key.data()[rest.len()..].iter().all(|b| *b == 0));
        }
        Err(_) => {
            assert!(rest.len() > KEY_MAX_SIZE);
            assert_eq!(key, before);
        }
    }
    assert_eq!(Key::with_data(key_type(tag), rest).is_ok(), rest.len() <= KEY_MAX_SIZE);

    key.set_type(key_type(tag.rotate_left(3)));
    let payload = key.payload();
    assert_eq!(payload.len(), key.key_type().data_size());
    assert_eq!(payload, &key.data()[..payload.len()]);
});
