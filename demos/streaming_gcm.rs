use galois_gcm::prelude::*;
use rand::RngCore;
use std::time::Instant;

const CHUNK_SIZE: usize = 4096 + 7;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate a random key and IV
    let mut key = [0u8; 32];
    let mut iv = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut key);
    rand::thread_rng().fill_bytes(&mut iv);

    let aad = b"Streaming GCM example";
    let size_mb = 8;
    let plaintext: Vec<u8> = (0..size_mb * 1_048_576).map(|i| (i % 251) as u8).collect();

    println!("Encrypting {}MB in chunks of {} bytes...", size_mb, CHUNK_SIZE);
    let mut gcm = Aes256Gcm::from_key(&key)?;
    let mut ciphertext = vec![0u8; plaintext.len()];

    let start = Instant::now();
    gcm.start(&iv)?;
    gcm.update_aad(aad)?;
    for (i, chunk) in plaintext.chunks(CHUNK_SIZE).enumerate() {
        gcm.encrypt_update(chunk, &mut ciphertext[i * CHUNK_SIZE..])?;
    }
    let tag = gcm.finish(16)?;
    let duration = start.elapsed();
    println!(
        "Encrypted in {:.2?} ({:.2} MB/s), tag {:?}",
        duration,
        size_mb as f64 / duration.as_secs_f64(),
        tag
    );

    // The one-shot API must agree with the streamed result
    let (one_shot, one_shot_tag) = gcm.encrypt(&iv, aad, &plaintext)?;
    assert_eq!(one_shot, ciphertext);
    assert_eq!(one_shot_tag, tag);

    println!("Decrypting and verifying...");
    let mut decrypted = vec![0u8; ciphertext.len()];
    let start = Instant::now();
    gcm.start(&iv)?;
    gcm.update_aad(aad)?;
    for (i, chunk) in ciphertext.chunks(CHUNK_SIZE).enumerate() {
        gcm.decrypt_update(chunk, &mut decrypted[i * CHUNK_SIZE..])?;
    }
    gcm.finish_and_check_tag(tag.as_bytes())?;
    println!("Decrypted in {:.2?}", start.elapsed());
    assert_eq!(decrypted, plaintext);

    // A single flipped bit is caught and the plaintext is withheld
    ciphertext[12345] ^= 0x01;
    match gcm.open(&iv, aad, &ciphertext, tag.as_bytes()) {
        Ok(_) => println!("Tampering went unnoticed!"),
        Err(e) => println!("Tampered ciphertext rejected: {}", e),
    }

    Ok(())
}
