use crate::error::KnockoutError;
use knockout_types::{Pivot, ProofStep};
use soroban_sdk::{Bytes, BytesN, Env, Vec};

/// Append one knockout node to a chain root
///
/// root' = sha256(root || epoch as 4 big-endian bytes || mileage as 16 big-endian bytes)
pub fn fold(env: &Env, root: &BytesN<32>, epoch: u32, mileage_x64: u128) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &root.to_array());
    preimage.extend_from_array(&epoch.to_be_bytes());
    preimage.extend_from_array(&mileage_x64.to_be_bytes());
    env.crypto().sha256(&preimage).to_bytes()
}

/// Fold every step of `proof` into `root`, in order
pub fn replay(env: &Env, root: &BytesN<32>, proof: &Vec<ProofStep>) -> BytesN<32> {
    let mut acc = root.clone();
    for step in proof.iter() {
        acc = fold(env, &acc, step.epoch, step.mileage_x64);
    }
    acc
}

/// Check that `proof` covers every knockout from `mint_epoch` through the
/// pivot's latest one and reproduces its chain root from `root`.
///
/// Returns the mileage recorded when `mint_epoch` was knocked out.
pub fn verify(
    env: &Env,
    pivot: &Pivot,
    root: &BytesN<32>,
    proof: &Vec<ProofStep>,
    mint_epoch: u32,
) -> Result<u128, KnockoutError> {
    let first = proof.first().ok_or(KnockoutError::BadProof)?;
    if first.epoch != mint_epoch {
        return Err(KnockoutError::BadProof);
    }

    let mut expected = mint_epoch;
    for step in proof.iter() {
        if step.epoch != expected {
            return Err(KnockoutError::BadProof);
        }
        expected += 1;
    }
    // Proof must end at the latest node
    if expected != pivot.epoch {
        return Err(KnockoutError::BadProof);
    }

    if replay(env, root, proof) != pivot.chain_root {
        return Err(KnockoutError::BadProof);
    }
    Ok(first.mileage_x64)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use soroban_sdk::{vec, Env};

    fn zero(env: &Env) -> BytesN<32> {
        BytesN::from_array(env, &[0u8; 32])
    }

    /// Pivot that has been knocked out once per entry of `mileages`
    fn knocked(env: &Env, mileages: &[u128]) -> (Pivot, std::vec::Vec<BytesN<32>>) {
        let mut pivot = Pivot::new(env);
        let mut roots = std::vec::Vec::new();
        for mileage in mileages {
            roots.push(pivot.chain_root.clone());
            pivot.chain_root = fold(env, &pivot.chain_root, pivot.epoch, *mileage);
            pivot.last_mileage_x64 = *mileage;
            pivot.epoch += 1;
        }
        (pivot, roots)
    }

    #[test]
    fn test_fold_is_deterministic_and_order_sensitive() {
        let env = Env::default();
        let a = fold(&env, &zero(&env), 0, 10);
        assert_eq!(a, fold(&env, &zero(&env), 0, 10));
        assert_ne!(a, zero(&env));
        assert_ne!(fold(&env, &a, 1, 20), fold(&env, &fold(&env, &zero(&env), 1, 20), 0, 10));
        assert_ne!(fold(&env, &zero(&env), 0, 11), a);
        assert_ne!(fold(&env, &zero(&env), 1, 10), a);
    }

    #[test]
    fn test_verify_full_history() {
        let env = Env::default();
        let (pivot, roots) = knocked(&env, &[100, 250, 400]);
        let proof = vec![
            &env,
            ProofStep { epoch: 0, mileage_x64: 100 },
            ProofStep { epoch: 1, mileage_x64: 250 },
            ProofStep { epoch: 2, mileage_x64: 400 },
        ];
        assert_eq!(verify(&env, &pivot, &roots[0], &proof, 0), Ok(100));
    }

    #[test]
    fn test_verify_suffix_from_intermediate_root() {
        let env = Env::default();
        let (pivot, roots) = knocked(&env, &[100, 250, 400]);
        let proof = vec![
            &env,
            ProofStep { epoch: 1, mileage_x64: 250 },
            ProofStep { epoch: 2, mileage_x64: 400 },
        ];
        assert_eq!(verify(&env, &pivot, &roots[1], &proof, 1), Ok(250));
    }

    #[test]
    fn test_verify_rejects_tampered_mileage() {
        let env = Env::default();
        let (pivot, roots) = knocked(&env, &[100, 250]);
        let proof = vec![
            &env,
            ProofStep { epoch: 0, mileage_x64: 999 },
            ProofStep { epoch: 1, mileage_x64: 250 },
        ];
        assert_eq!(verify(&env, &pivot, &roots[0], &proof, 0), Err(KnockoutError::BadProof));
    }

    #[test]
    fn test_verify_rejects_gaps_and_short_proofs() {
        let env = Env::default();
        let (pivot, roots) = knocked(&env, &[100, 250, 400]);

        let gap = vec![
            &env,
            ProofStep { epoch: 0, mileage_x64: 100 },
            ProofStep { epoch: 2, mileage_x64: 400 },
        ];
        assert_eq!(verify(&env, &pivot, &roots[0], &gap, 0), Err(KnockoutError::BadProof));

        let short = vec![
            &env,
            ProofStep { epoch: 0, mileage_x64: 100 },
            ProofStep { epoch: 1, mileage_x64: 250 },
        ];
        assert_eq!(verify(&env, &pivot, &roots[0], &short, 0), Err(KnockoutError::BadProof));

        let empty: Vec<ProofStep> = Vec::new(&env);
        assert_eq!(verify(&env, &pivot, &roots[0], &empty, 0), Err(KnockoutError::BadProof));
    }

    #[test]
    fn test_verify_rejects_wrong_starting_root() {
        let env = Env::default();
        let (pivot, roots) = knocked(&env, &[100, 250]);
        let proof = vec![&env, ProofStep { epoch: 1, mileage_x64: 250 }];
        assert_eq!(verify(&env, &pivot, &roots[0], &proof, 1), Err(KnockoutError::BadProof));
        assert_eq!(verify(&env, &pivot, &roots[1], &proof, 1), Ok(250));
    }
}
