use criterion::{criterion_group, criterion_main, Criterion};
use honk::flavor::{AllEntities, Flavor, ProverPolynomials, UltraFlavor};
use honk::honk::witness::compute_grand_product;
use honk::polynomials::Polynomial;
use honk::relations::{compute_subrelation_separators, RelationParameters};
use honk::sumcheck::SumcheckProver;
use honk::transcript::HonkTranscript;
use honk_algebra::{bn254::BN254Scalar, prelude::*};

type F = BN254Scalar;

/// A circuit of `2^log_n` rows where every row after the first is a random
/// multiplication gate, wired by the identity permutation.
fn mul_circuit<R: CryptoRng + RngCore>(prng: &mut R, log_n: usize) -> ProverPolynomials<F> {
    let n = 1 << log_n;
    let mut polys = AllEntities::<Polynomial<F>>::default();
    polys.iter_mut().for_each(|p| *p = Polynomial::zero(n));
    for i in 1..n {
        let a = F::random(prng);
        let b = F::random(prng);
        polys.w_l.coefs[i] = a;
        polys.w_r.coefs[i] = b;
        polys.w_o.coefs[i] = a.mul(&b);
        polys.q_m.coefs[i] = F::one();
        polys.q_o.coefs[i] = F::one().neg();
        polys.q_arith.coefs[i] = F::one();
    }
    let ids = [
        &mut polys.id_1,
        &mut polys.id_2,
        &mut polys.id_3,
        &mut polys.id_4,
    ];
    for (k, id) in ids.into_iter().enumerate() {
        *id = Polynomial::new((0..n).map(|i| F::from((k * n + i) as u64)).collect());
    }
    polys.sigma_1 = polys.id_1.clone();
    polys.sigma_2 = polys.id_2.clone();
    polys.sigma_3 = polys.id_3.clone();
    polys.sigma_4 = polys.id_4.clone();
    polys.lagrange_first.coefs[0] = F::one();
    polys.lagrange_last.coefs[n - 1] = F::one();
    polys.set_shifted();
    polys
}

fn bench_sumcheck(c: &mut Criterion) {
    let mut prng = test_rng();

    let mut sumcheck_group = c.benchmark_group("bench_sumcheck");
    sumcheck_group.sample_size(10);
    for log_n in [10usize, 12, 14] {
        let mut polys = mul_circuit(&mut prng, log_n);
        let params = RelationParameters {
            eta: F::random(&mut prng),
            eta_two: F::random(&mut prng),
            eta_three: F::random(&mut prng),
            beta: F::random(&mut prng),
            gamma: F::random(&mut prng),
            public_input_delta: F::one(),
        };
        compute_grand_product(&mut polys, &params).unwrap();
        let alpha = F::random(&mut prng);
        let alphas = compute_subrelation_separators(&alpha, UltraFlavor::NUM_SUBRELATIONS);
        let gate_challenges: Vec<F> = (0..log_n).map(|_| F::random(&mut prng)).collect();

        sumcheck_group.bench_function(format!("sumcheck prover 2^{}", log_n), |b| {
            b.iter(|| {
                let mut transcript = HonkTranscript::new(b"BenchSumcheck");
                let mut prover = SumcheckProver::<UltraFlavor>::new(1 << log_n).unwrap();
                prover
                    .prove(
                        &polys,
                        &params,
                        &alphas,
                        &gate_challenges,
                        &mut transcript,
                        None,
                    )
                    .unwrap()
            })
        });
    }
    sumcheck_group.finish();
}

criterion_group!(benches, bench_sumcheck);
criterion_main!(benches);
