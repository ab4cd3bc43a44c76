//! Golden vectors for the control-plane challenge/response transform.
//!
//! The remote server recomputes the same value, so these must never change.

use nuit_proto::control::{authenticate, Hello, Identified, Identify};

const SECRET: &str = "supersecretpassword";
const CHALLENGE: &str = "+IxH4CnCiqpX1rM9scsNynZzbOe4KhDeYcTNS3PDaeY=";
const SALT: &str = "lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI=";
const EXPECTED: &str = "1Ct943GAT+6YQUUX47Ia/ncufilbe6+oD6lY+5kaCu4=";

#[test]
fn reference_vector() {
    assert_eq!(authenticate(SECRET, CHALLENGE, SALT), EXPECTED);
}

#[test]
fn salt_and_challenge_are_not_interchangeable() {
    assert_ne!(authenticate(SECRET, SALT, CHALLENGE), EXPECTED);
}

#[test]
fn empty_secret_still_hashes() {
    let out = authenticate("", "", "");
    // base64 of a 32-byte digest is always 44 chars with one pad
    assert_eq!(out.len(), 44);
    assert!(out.ends_with('='));
}

#[test]
fn full_exchange_round() {
    let hello = format!(
        r#"{{"op":0,"d":{{"rpcVersion":1,"authentication":{{"challenge":"{CHALLENGE}","salt":"{SALT}"}}}}}}"#
    );
    let hello = Hello::decode(&hello).expect("hello");
    let identify = Identify::answer(&hello, SECRET);
    assert_eq!(identify.authentication.as_deref(), Some(EXPECTED));

    let ack = Identified::decode(r#"{"op":2,"d":{"negotiatedRpcVersion":1}}"#).expect("ack");
    assert_eq!(ack.negotiated_rpc_version, 1);
}
