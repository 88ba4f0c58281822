//! Normalization of raw counts to expression values

mod tpm;

pub use tpm::{counts2tpm, counts2tpm_many, normalize, TPM_SCALE};
