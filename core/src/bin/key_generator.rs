//! Generates validator keypairs for a new bridge deployment. Writes one
//! JSON file per validator to `KEY_DIR` (`configs/` by default),
//! matching `bridge::validator::Validator::public_key`'s `XOnlyPublicKey`
//! identity and the Schnorr scheme `bridge::validator::ValidatorSignature`
//! signs with.

use secp256k1::{Keypair, Secp256k1, SecretKey, XOnlyPublicKey};
use serde::Serialize;
use std::{
    env,
    fs::{self, File},
    io::Write,
};

const ENV_DIR: &str = "KEY_DIR";
const DIRECTORY: &str = "configs";
const PREFIX: &str = "validator-key";

#[derive(Serialize)]
struct ValidatorKeyFile {
    id: usize,
    secret_key: String,
    public_key: XOnlyPublicKey,
}

fn main() {
    let directory = env::var(ENV_DIR).unwrap_or_else(|_| DIRECTORY.to_string());
    let count: usize = env::var("NUM_VALIDATORS")
        .unwrap_or_else(|_| "1".to_string())
        .parse()
        .expect("NUM_VALIDATORS must be a positive integer");

    let _ = fs::create_dir(&directory);

    let secp = Secp256k1::new();
    for id in 0..count {
        let secret_key = SecretKey::new(&mut secp256k1::rand::thread_rng());
        let keypair = Keypair::from_secret_key(&secp, &secret_key);
        let (public_key, _parity) = XOnlyPublicKey::from_keypair(&keypair);

        let file = ValidatorKeyFile {
            id,
            secret_key: hex::encode(secret_key.secret_bytes()),
            public_key,
        };
        println!("generated validator {id}: {}", file.public_key);

        let path = format!("{directory}/{PREFIX}-{id}.json");
        let serialized = serde_json::to_string_pretty(&file).expect("validator key file always serializes");
        let mut handle = File::create(&path).unwrap_or_else(|e| panic!("cannot create {path}: {e}"));
        handle.write_all(serialized.as_bytes()).unwrap_or_else(|e| panic!("cannot write {path}: {e}"));
    }
}
