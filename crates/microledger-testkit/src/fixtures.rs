//! Keypair and genesis fixtures

use microledger_core::{SigningKeypair, Value};
use microledger_crypto::{key_id, keypair_from_seed, SEED_BYTES};
use serde_json::json;

/// Keypair derived from a seed filled with `seed`
pub fn keypair(seed: u8) -> SigningKeypair {
    keypair_from_seed(&[seed; SEED_BYTES])
}

/// Gated genesis document giving `admin` every grant the demo rules know
///
/// The admin profile carries the `edge` role. Rules grant `register` and
/// `key_admin` to the admin by key id, `authcrypt` and `sign` to `edge`, and
/// `route` plus `authcrypt` to `cloud`.
pub fn authorized_genesis(admin: &SigningKeypair) -> Value {
    let admin_id = key_id(admin.public_key());
    json!({
        "publicKey": [{"name": "root", "key": hex::encode(admin.public_key())}],
        "authorization": {
            "profiles": [
                {"key": admin_id, "roles": ["edge"]}
            ],
            "rules": [
                {"grant": ["register", "key_admin"], "when": {"id": admin_id}},
                {"grant": ["authcrypt", "sign"], "when": {"roles": "edge"}},
                {"grant": ["route", "authcrypt"], "when": {"roles": "cloud"}}
            ]
        }
    })
}
