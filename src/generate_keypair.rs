//! RSA key pairs and certificate serial numbers.
//!
//! Both come straight from the OpenSSL CSPRNG. A failure here means the
//! process has no usable entropy or crypto backend, so it is reported as an
//! environment failure and never retried.

use crate::error::{MktlsError, Result};
use openssl::asn1::Asn1Integer;
use openssl::bn::{BigNum, MsbOption};
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;

const ROOT_KEY_BITS: u32 = 3072;
const LEAF_KEY_BITS: u32 = 2048;
const SERIAL_NUMBER_BITS: i32 = 128;

/// How strong a freshly generated key must be.
///
/// The root outlives every leaf it signs, so it gets the larger modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrength {
    Root,
    Leaf,
}

impl KeyStrength {
    /// RSA modulus size in bits.
    pub fn bits(self) -> u32 {
        match self {
            KeyStrength::Root => ROOT_KEY_BITS,
            KeyStrength::Leaf => LEAF_KEY_BITS,
        }
    }
}

/// Generate a fresh RSA key pair of the requested strength.
///
/// # Example
/// ```rust,no_run
/// use mktls::generate_keypair::{generate_key_pair, KeyStrength};
///
/// let key = generate_key_pair(KeyStrength::Leaf)?;
/// assert_eq!(key.bits(), 2048);
/// # Ok::<(), mktls::MktlsError>(())
/// ```
pub fn generate_key_pair(strength: KeyStrength) -> Result<PKey<Private>> {
    let rsa = Rsa::generate(strength.bits())
        .map_err(MktlsError::environment("failed to generate RSA keypair"))?;

    PKey::from_rsa(rsa).map_err(MktlsError::environment("failed to create private key"))
}

/// A certificate serial number in `[0, 2^128)`.
#[derive(Debug)]
pub struct SerialNumber(BigNum);

impl SerialNumber {
    /// The serial as the ASN.1 INTEGER embedded in the certificate.
    pub fn to_asn1_integer(&self) -> Result<Asn1Integer> {
        self.0
            .to_asn1_integer()
            .map_err(MktlsError::encoding("failed to encode serial number"))
    }

    /// Big-endian magnitude without leading zero bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Uppercase hex, as printed by `openssl x509 -serial`.
    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{:02X}", b)).collect()
    }
}

/// Draw a uniformly random 128-bit serial number.
pub fn generate_serial_number() -> Result<SerialNumber> {
    let mut serial = BigNum::new().map_err(MktlsError::environment("failed to allocate serial"))?;
    serial
        .rand(SERIAL_NUMBER_BITS, MsbOption::MAYBE_ZERO, false)
        .map_err(MktlsError::environment("failed to generate serial number"))?;
    Ok(SerialNumber(serial))
}
