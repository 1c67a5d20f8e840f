// Cross-check against the RustCrypto `aes-gcm` crate on random inputs.

use aes_gcm::aead::consts::{U12, U16, U8};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::AesGcm;
use galois_gcm::gcm::{Aes128Gcm, Aes256Gcm};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}

#[test]
fn test_aes128_matches_reference() {
    let mut rng = StdRng::seed_from_u64(0x6763_6d01);

    for _ in 0..64 {
        let key = random_bytes(&mut rng, 16);
        let iv = random_bytes(&mut rng, 12);
        let aad_len = rng.gen_range(0..70);
        let aad = random_bytes(&mut rng, aad_len);
        let msg_len = rng.gen_range(0..300);
        let msg = random_bytes(&mut rng, msg_len);

        let reference = aes_gcm::Aes128Gcm::new_from_slice(&key).unwrap();
        let expected = reference
            .encrypt(GenericArray::from_slice(&iv), Payload { msg: &msg, aad: &aad })
            .unwrap();

        let gcm = Aes128Gcm::from_key(&key).unwrap();
        let (ct, tag) = gcm.encrypt(&iv, &aad, &msg).unwrap();

        assert_eq!(&expected[..msg.len()], &ct[..]);
        assert_eq!(&expected[msg.len()..], tag.as_bytes());

        // and the reference accepts ours
        let mut sealed = ct.clone();
        sealed.extend_from_slice(tag.as_bytes());
        let opened = reference
            .decrypt(GenericArray::from_slice(&iv), Payload { msg: &sealed, aad: &aad })
            .unwrap();
        assert_eq!(opened, msg);
    }
}

#[test]
fn test_aes256_matches_reference() {
    let mut rng = StdRng::seed_from_u64(0x6763_6d02);

    for _ in 0..32 {
        let key = random_bytes(&mut rng, 32);
        let iv = random_bytes(&mut rng, 12);
        let aad_len = rng.gen_range(0..40);
        let aad = random_bytes(&mut rng, aad_len);
        let msg_len = rng.gen_range(0..500);
        let msg = random_bytes(&mut rng, msg_len);

        let reference = aes_gcm::Aes256Gcm::new_from_slice(&key).unwrap();
        let expected = reference
            .encrypt(GenericArray::from_slice(&iv), Payload { msg: &msg, aad: &aad })
            .unwrap();

        let gcm = Aes256Gcm::from_key(&key).unwrap();
        let pt = gcm
            .open(&iv, &aad, &expected[..msg.len()], &expected[msg.len()..])
            .unwrap();
        assert_eq!(pt, msg);
    }
}

#[test]
fn test_64_bit_iv_matches_reference() {
    type Reference = AesGcm<aes::Aes128, U8>;
    let mut rng = StdRng::seed_from_u64(0x6763_6d03);

    for _ in 0..16 {
        let key = random_bytes(&mut rng, 16);
        let iv = random_bytes(&mut rng, 8);
        let msg_len = rng.gen_range(1..100);
        let msg = random_bytes(&mut rng, msg_len);

        let reference = Reference::new_from_slice(&key).unwrap();
        let expected = reference
            .encrypt(GenericArray::from_slice(&iv), Payload { msg: &msg, aad: b"hdr" })
            .unwrap();

        let gcm = Aes128Gcm::from_key(&key).unwrap();
        let (ct, tag) = gcm.encrypt(&iv, b"hdr", &msg).unwrap();
        assert_eq!(&expected[..msg.len()], &ct[..]);
        assert_eq!(&expected[msg.len()..], tag.as_bytes());
    }
}

#[test]
fn test_truncated_tag_matches_reference() {
    type Reference = AesGcm<aes::Aes128, U12, U12>;
    let mut rng = StdRng::seed_from_u64(0x6763_6d04);

    let key = random_bytes(&mut rng, 16);
    let iv = random_bytes(&mut rng, 12);
    let msg = random_bytes(&mut rng, 77);

    let reference = Reference::new_from_slice(&key).unwrap();
    let expected = reference
        .encrypt(GenericArray::from_slice(&iv), Payload { msg: &msg, aad: &[] })
        .unwrap();

    let gcm = Aes128Gcm::from_key(&key).unwrap();
    let (ct, tag) = gcm.encrypt_with_tag_len(&iv, &[], &msg, 12).unwrap();
    assert_eq!(&expected[..msg.len()], &ct[..]);
    assert_eq!(&expected[msg.len()..], tag.as_bytes());

    // full-length reference tag begins with the truncated one
    let full = AesGcm::<aes::Aes128, U12, U16>::new_from_slice(&key)
        .unwrap()
        .encrypt(GenericArray::from_slice(&iv), Payload { msg: &msg, aad: &[] })
        .unwrap();
    assert_eq!(&full[msg.len()..msg.len() + 12], tag.as_bytes());
}
