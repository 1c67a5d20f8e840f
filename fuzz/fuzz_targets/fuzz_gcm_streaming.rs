#![no_main]

use arbitrary::Arbitrary;
use galois_gcm::gcm::Aes128Gcm;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct StreamingInput {
    key: [u8; 16],
    iv: Vec<u8>,
    aad: Vec<u8>,
    plaintext: Vec<u8>,
    aad_splits: Vec<u8>,
    data_splits: Vec<u8>,
    tag_len: u8,
}

fn feed<F>(data: &[u8], splits: &[u8], mut f: F)
where
    F: FnMut(usize, &[u8]),
{
    let mut offset = 0;
    for &split in splits {
        let end = (offset + split as usize).min(data.len());
        f(offset, &data[offset..end]);
        offset = end;
    }
    f(offset, &data[offset..]);
}

fuzz_target!(|input: StreamingInput| {
    let gcm = match Aes128Gcm::from_key(&input.key) {
        Ok(gcm) => gcm,
        Err(_) => return,
    };
    let tag_len = input.tag_len as usize;

    // Parameter errors are fine; anything accepted must round trip
    let (ciphertext, tag) =
        match gcm.encrypt_with_tag_len(&input.iv, &input.aad, &input.plaintext, tag_len) {
            Ok(sealed) => sealed,
            Err(_) => return,
        };

    // Streaming with arbitrary splits must agree with the one-shot call
    let mut streaming = Aes128Gcm::from_key(&input.key).unwrap();
    let mut streamed = vec![0u8; input.plaintext.len()];
    streaming.start(&input.iv).unwrap();
    feed(&input.aad, &input.aad_splits, |_, piece| {
        streaming.update_aad(piece).unwrap()
    });
    feed(&input.plaintext, &input.data_splits, |offset, piece| {
        streaming.encrypt_update(piece, &mut streamed[offset..]).unwrap()
    });
    let streamed_tag = streaming.finish(tag_len).unwrap();

    assert_eq!(streamed, ciphertext);
    assert_eq!(streamed_tag, tag);

    let opened = gcm
        .open(&input.iv, &input.aad, &ciphertext, tag.as_bytes())
        .unwrap();
    assert_eq!(opened, input.plaintext);
});
