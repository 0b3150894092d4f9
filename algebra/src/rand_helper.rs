use rand_chacha::{
    rand_core::{CryptoRng, RngCore, SeedableRng},
    ChaChaRng,
};

/// The environment variable that pins `test_rng` to a fixed seed.
pub const DETERMINISTIC_TEST_RNG: &str = "DETERMINISTIC_TEST_RNG";

fn seeded_rng() -> ChaChaRng {
    // arbitrary seed
    let seed = [
        7, 0, 0, 0, 41, 0, 0, 0, 131, 2, 0, 0, 17, 93, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0,
    ];
    ChaChaRng::from_seed(seed)
}

/// Should be used only for tests, not for any real world usage.
#[cfg(not(feature = "std"))]
pub fn test_rng() -> impl RngCore + CryptoRng {
    seeded_rng()
}

/// Should be used only for tests, not for any real world usage.
/// Setting `DETERMINISTIC_TEST_RNG=1` makes every call return the same stream.
#[cfg(feature = "std")]
pub fn test_rng() -> impl RngCore + CryptoRng {
    match std::env::var(DETERMINISTIC_TEST_RNG) {
        Ok(val) if val == "1" => seeded_rng(),
        _ => ChaChaRng::from_entropy(),
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use ark_std::UniformRand;

    #[test]
    fn test_deterministic_rng() {
        let mut rng = super::test_rng();
        let a = u128::rand(&mut rng);
        let mut rng = super::test_rng();
        let b = u128::rand(&mut rng);
        assert_ne!(a, b);

        std::env::set_var(super::DETERMINISTIC_TEST_RNG, "1");
        let mut rng = super::test_rng();
        let a = u128::rand(&mut rng);
        let mut rng = super::test_rng();
        let b = u128::rand(&mut rng);
        std::env::remove_var(super::DETERMINISTIC_TEST_RNG);
        assert_eq!(a, b);
    }
}
