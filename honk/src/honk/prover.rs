use crate::errors::Result;
use crate::flavor::Flavor;
use crate::honk::{
    indexer::HonkPK,
    witness::{compute_grand_product, compute_logderivative_inverses},
    HonkProof, HONK_TRANSCRIPT_LABEL,
};
use crate::poly_commit::{
    gemini::PolynomialBatcher, pcs::PolyComScheme, shplemini::ShpleminiProver,
    small_subgroup_ipa::SmallSubgroupIPAProver,
};
use crate::relations::{compute_subrelation_separators, RelationParameters};
use crate::sumcheck::{SumcheckProver, ZKSumcheckData};
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// Honk prover: it produces a proof that the wires of `pk` satisfy the relations of
/// the flavor over its precomputed polynomials.
///
/// The lookup inverses and the permutation grand product are computed here; the
/// values of those two columns in `pk` are ignored.
/// # Example
/// ```
/// use honk::flavor::{AllEntities, UltraFlavor};
/// use honk::honk::{indexer::indexer, prover::prover, verifier::verifier};
/// use honk::poly_commit::kzg_poly_com::KZGCommitmentSchemeBN254;
/// use honk::polynomials::Polynomial;
/// use honk_algebra::{bn254::BN254Scalar, prelude::*};
/// use rand_chacha::ChaChaRng;
///
/// let mut prng = ChaChaRng::from_seed([0u8; 32]);
/// let pcs = KZGCommitmentSchemeBN254::new(16, &mut prng);
///
/// // a single gate 2 * 3 = 6 on row 1
/// let col = |v: u32| {
///     let mut p = Polynomial::zero(4);
///     p.coefs[1] = BN254Scalar::from(v);
///     p
/// };
/// let mut polys = AllEntities::<Polynomial<BN254Scalar>>::default();
/// polys.iter_mut().for_each(|p| *p = Polynomial::zero(4));
/// polys.w_l = col(2);
/// polys.w_r = col(3);
/// polys.w_o = col(6);
/// polys.q_m = col(1);
/// polys.q_o = col(1).mul_scalar(&BN254Scalar::one().neg());
/// polys.q_arith = col(1);
/// polys.lagrange_first.coefs[0] = BN254Scalar::one();
/// polys.lagrange_last.coefs[3] = BN254Scalar::one();
///
/// let (pk, vk) = indexer::<UltraFlavor>(polys, &pcs).unwrap();
/// let proof = prover::<UltraFlavor, _>(&mut prng, &pcs, &pk).unwrap();
/// assert!(verifier::<UltraFlavor>(&pcs, &vk, &proof).unwrap());
/// ```
pub fn prover<FL: Flavor, R: CryptoRng + RngCore>(
    prng: &mut R,
    pcs: &FL::PCS,
    pk: &HonkPK<FL>,
) -> Result<HonkProof> {
    let prover_timer = start_timer!(|| format!("Honk::Prover ({})", FL::NAME));
    let mut transcript = HonkTranscript::new(HONK_TRANSCRIPT_LABEL);
    let mut polynomials = pk.polynomials.clone();
    polynomials.set_shifted();
    let log_n = pk.log_circuit_size;

    transcript.send_to_verifier("circuit_size", &pk.circuit_size_u64());

    let wires_time = start_timer!(|| "Commit to the wires");
    for (label, poly) in [
        ("W_L", &polynomials.w_l),
        ("W_R", &polynomials.w_r),
        ("W_O", &polynomials.w_o),
    ] {
        let commitment = pcs.commit(poly)?;
        transcript.send_to_verifier(label, &commitment);
    }
    let etas: Vec<FL::FF> = transcript.get_challenges(&["eta", "eta_two", "eta_three"]);

    for (label, poly) in [
        ("LOOKUP_READ_COUNTS", &polynomials.lookup_read_counts),
        ("LOOKUP_READ_TAGS", &polynomials.lookup_read_tags),
        ("W_4", &polynomials.w_4),
    ] {
        let commitment = pcs.commit(poly)?;
        transcript.send_to_verifier(label, &commitment);
    }
    end_timer!(wires_time);

    let beta_gamma: Vec<FL::FF> = transcript.get_challenges(&["beta", "gamma"]);
    let relation_parameters = RelationParameters {
        eta: etas[0],
        eta_two: etas[1],
        eta_three: etas[2],
        beta: beta_gamma[0],
        gamma: beta_gamma[1],
        public_input_delta: FL::FF::one(),
    };

    compute_logderivative_inverses(&mut polynomials, &relation_parameters)?;
    let commitment = pcs.commit(&polynomials.lookup_inverses)?;
    transcript.send_to_verifier("LOOKUP_INVERSES", &commitment);

    compute_grand_product(&mut polynomials, &relation_parameters)?;
    let commitment = pcs.commit(&polynomials.z_perm)?;
    transcript.send_to_verifier("Z_PERM", &commitment);

    #[cfg(feature = "debug")]
    crate::relations::check_circuit_relations::<FL::FF, FL::Relations>(
        &polynomials,
        &relation_parameters,
    )?;

    let alpha: FL::FF = transcript.get_challenge("alpha");
    let alphas = compute_subrelation_separators(&alpha, FL::NUM_SUBRELATIONS);
    let gate_challenges: Vec<FL::FF> = transcript.get_challenges(&gate_challenge_labels(log_n));

    let mut zk_sumcheck_data = if FL::HAS_ZK {
        Some(ZKSumcheckData::new(log_n, &mut transcript, pcs, prng)?)
    } else {
        None
    };

    let sumcheck_time = start_timer!(|| "Sumcheck");
    let mut sumcheck = SumcheckProver::<FL>::new(pk.circuit_size)?;
    let sumcheck_output = sumcheck.prove(
        &polynomials,
        &relation_parameters,
        &alphas,
        &gate_challenges,
        &mut transcript,
        zk_sumcheck_data.as_mut(),
    )?;
    end_timer!(sumcheck_time);

    let small_subgroup_ipa = match (zk_sumcheck_data.as_ref(), sumcheck_output.claimed_libra_evaluation) {
        (Some(zk_data), Some(claimed_evaluation)) => {
            let ipa = SmallSubgroupIPAProver::new(
                zk_data,
                &sumcheck_output.challenge,
                claimed_evaluation,
                prng,
            )?;
            ipa.prove(pcs, &mut transcript)?;
            Some(ipa)
        }
        _ => None,
    };

    let mut batcher = PolynomialBatcher::new(pk.circuit_size);
    batcher.set_unshifted(polynomials.get_unshifted());
    batcher.set_to_be_shifted(polynomials.get_to_be_shifted());
    let opening_claim = ShpleminiProver::prove(
        &sumcheck_output.challenge,
        &batcher,
        pcs,
        &mut transcript,
        small_subgroup_ipa.as_ref(),
        prng,
    )?;
    pcs.compute_opening_proof(opening_claim, &mut transcript)?;

    end_timer!(prover_timer);
    Ok(HonkProof {
        proof_data: transcript.export_proof(),
    })
}

/// The labels of the gate separator challenges.
pub(crate) fn gate_challenge_labels(log_n: usize) -> Vec<String> {
    (0..log_n)
        .map(|i| format!("Sumcheck:gate_challenge_{}", i))
        .collect()
}
