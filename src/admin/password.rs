//! Random password generation.

use zeroize::Zeroizing;

use crate::config::PasswordPolicy;
use crate::Error;

/// Generates a password from the OS random number generator.
///
/// Characters are drawn uniformly from the policy's alphabet: random bytes
/// at or above the largest multiple of the alphabet size are discarded.
pub fn generate_password(policy: &PasswordPolicy) -> Result<Zeroizing<String>, Error> {
    generate_with(policy, |buf| {
        getrandom::getrandom(buf)
            .map_err(|e| Error::internal(format!("OS random number generator failed: {}", e)))
    })
}

pub(crate) fn generate_with<F>(policy: &PasswordPolicy, mut fill: F) -> Result<Zeroizing<String>, Error>
where
    F: FnMut(&mut [u8]) -> Result<(), Error>,
{
    policy.validate()?;

    let alphabet = policy.alphabet.as_bytes();
    // validate() bounds the alphabet to 1..=256 ASCII characters
    let size = alphabet.len();
    let limit = 256 - (256 % size);

    let mut password = Zeroizing::new(String::with_capacity(policy.length));
    let mut buf = Zeroizing::new([0u8; 64]);
    let mut available = 0;

    for index in 0..policy.length {
        if policy.is_separator_position(index) {
            password.push(policy.separator);
            continue;
        }

        let byte = loop {
            if available == 0 {
                fill(&mut buf[..])?;
                available = buf.len();
            }
            available -= 1;
            let byte = buf[available] as usize;
            if byte < limit {
                break byte;
            }
        };
        password.push(alphabet[byte % size] as char);
    }

    Ok(password)
}
