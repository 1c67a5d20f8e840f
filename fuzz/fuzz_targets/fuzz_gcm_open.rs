#![no_main]

use arbitrary::Arbitrary;
use galois_gcm::gcm::Aes256Gcm;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct OpenInput {
    key: [u8; 32],
    iv: Vec<u8>,
    aad: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

fuzz_target!(|input: OpenInput| {
    let gcm = match Aes256Gcm::from_key(&input.key) {
        Ok(gcm) => gcm,
        Err(_) => return,
    };

    // Forged input must be rejected without panicking and never yield plaintext
    let checked = gcm.check(&input.iv, &input.aad, &input.ciphertext, &input.tag);
    let opened = gcm.open(&input.iv, &input.aad, &input.ciphertext, &input.tag);
    assert_eq!(checked, opened.is_ok());
});
