use marc_crypto::{decrypt_with, encrypt_with, KdfParams};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

// Cheap KDF so the numbers reflect the cipher + MAC, not PBKDF2.
fn cheap_kdf() -> KdfParams {
    KdfParams { iterations: 1 }
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let password = SecretString::from("bench-password");
    let params = cheap_kdf();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt_with(
                divan::black_box(&data),
                divan::black_box(&password),
                &params,
            )
            .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let password = SecretString::from("bench-password");
    let params = cheap_kdf();
    let data = make_data(size);
    let encrypted = encrypt_with(&data, &password, &params).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            decrypt_with(
                divan::black_box(&encrypted),
                divan::black_box(&password),
                &params,
            )
            .unwrap()
        });
}

#[divan::bench(sample_count = 10)]
fn bench_derive_key_default() -> marc_crypto::DerivedKey {
    let password = SecretString::from("bench-password");
    marc_crypto::derive_key(
        divan::black_box(&password),
        &[7u8; marc_crypto::SALT_SIZE],
        &KdfParams::default(),
    )
}

fn main() {
    divan::main();
}
