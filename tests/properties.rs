// Property tests for round trips, tamper detection, tag lengths and
// streaming split invariance.

use galois_gcm::gcm::Aes128Gcm;
use proptest::prelude::*;

fn message() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..200)
}

fn encrypt_streamed(
    gcm: &mut Aes128Gcm,
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    aad_split: usize,
    data_splits: &[usize],
) -> (Vec<u8>, Vec<u8>) {
    let mut ct = vec![0u8; plaintext.len()];

    gcm.start(iv).unwrap();
    let (a, b) = aad.split_at(aad_split.min(aad.len()));
    gcm.update_aad(a).unwrap();
    gcm.update_aad(b).unwrap();

    let mut offset = 0;
    for &split in data_splits {
        let end = (offset + split).min(plaintext.len());
        gcm.encrypt_update(&plaintext[offset..end], &mut ct[offset..])
            .unwrap();
        offset = end;
    }
    gcm.encrypt_update(&plaintext[offset..], &mut ct[offset..])
        .unwrap();

    let tag = gcm.finish(16).unwrap();
    (ct, tag.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(
        key in prop::array::uniform16(any::<u8>()),
        iv in prop::collection::vec(any::<u8>(), 1..40),
        aad in message(),
        plaintext in message(),
    ) {
        let gcm = Aes128Gcm::from_key(&key).unwrap();
        let (ct, tag) = gcm.encrypt(&iv, &aad, &plaintext).unwrap();

        prop_assert_eq!(ct.len(), plaintext.len());
        prop_assert!(gcm.check(&iv, &aad, &ct, tag.as_bytes()));
        prop_assert_eq!(gcm.open(&iv, &aad, &ct, tag.as_bytes()).unwrap(), plaintext);
    }

    #[test]
    fn prop_any_bit_flip_is_detected(
        key in prop::array::uniform16(any::<u8>()),
        aad in message(),
        plaintext in prop::collection::vec(any::<u8>(), 1..200),
        target in 0usize..4,
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let gcm = Aes128Gcm::from_key(&key).unwrap();
        let mut iv = [0x11u8; 12];
        let (mut ct, tag) = gcm.encrypt(&iv, &aad, &plaintext).unwrap();
        let mut tag = tag.to_vec();
        let mut aad = aad;

        match target {
            0 => {
                let i = position.index(ct.len());
                ct[i] ^= 1 << bit;
            }
            1 => {
                let i = position.index(tag.len());
                tag[i] ^= 1 << bit;
            }
            2 => {
                let i = position.index(iv.len());
                iv[i] ^= 1 << bit;
            }
            _ if aad.is_empty() => aad.push(0),
            _ => {
                let i = position.index(aad.len());
                aad[i] ^= 1 << bit;
            }
        }

        prop_assert!(!gcm.check(&iv, &aad, &ct, &tag));
        let err = gcm.open(&iv, &aad, &ct, &tag).unwrap_err();
        prop_assert!(err.is_authentication_failure());
    }

    #[test]
    fn prop_tag_length_bounds(len in 0usize..40) {
        let gcm = Aes128Gcm::from_key(&[3u8; 16]).unwrap();
        let result = gcm.encrypt_with_tag_len(&[0u8; 12], b"", b"payload", len);

        if (4..=16).contains(&len) {
            let (_, tag) = result.unwrap();
            prop_assert_eq!(tag.len(), len);
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn prop_streaming_split_invariance(
        key in prop::array::uniform16(any::<u8>()),
        aad in message(),
        plaintext in message(),
        aad_split in 0usize..200,
        data_splits in prop::collection::vec(0usize..40, 0..10),
    ) {
        let mut gcm = Aes128Gcm::from_key(&key).unwrap();
        let iv = [0x5au8; 12];
        let (ct, tag) = gcm.encrypt(&iv, &aad, &plaintext).unwrap();

        let (streamed_ct, streamed_tag) =
            encrypt_streamed(&mut gcm, &iv, &aad, &plaintext, aad_split, &data_splits);

        prop_assert_eq!(streamed_ct, ct);
        prop_assert_eq!(streamed_tag, tag.to_vec());
    }
}
