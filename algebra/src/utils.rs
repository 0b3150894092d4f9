use crate::prelude::*;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

const BASE64_PADDING_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const BASE64_ENGINE: GeneralPurpose = GeneralPurpose::new(&URL_SAFE, BASE64_PADDING_CONFIG);

/// Convert the input into the base64 encoding
pub fn b64enc<T: ?Sized + AsRef<[u8]>>(input: &T) -> String {
    BASE64_ENGINE.encode(input)
}

/// Reconstruct from the base64 encoding
pub fn b64dec<T: ?Sized + AsRef<[u8]>>(input: &T) -> Result<Vec<u8>> {
    BASE64_ENGINE
        .decode(input)
        .map_err(|_| AlgebraError::DeserializationError)
}

/// Invert all the nonzero entries of `values` in place with a single field inversion
/// (Montgomery's trick). Zero entries are left untouched.
pub fn batch_inversion<S: Scalar>(values: &mut [S]) {
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = S::one();
    for v in values.iter().filter(|v| !v.is_zero()) {
        prefix.push(acc);
        acc.mul_assign(v);
    }

    // safe unwrap: `acc` is a product of nonzero elements
    let mut acc_inv = acc.inv().unwrap();

    for (v, p) in values
        .iter_mut()
        .rev()
        .filter(|v| !v.is_zero())
        .zip(prefix.into_iter().rev())
    {
        let inverse = acc_inv.mul(&p);
        acc_inv.mul_assign(&*v);
        *v = inverse;
    }
}

/// Return `[1, base, base^2, ..., base^(count - 1)]`.
pub fn powers<S: Scalar>(base: &S, count: usize) -> Vec<S> {
    let mut res = Vec::with_capacity(count);
    let mut cur = S::one();
    for _ in 0..count {
        res.push(cur);
        cur.mul_assign(base);
    }
    res
}

#[cfg(test)]
mod test {
    use crate::bn254::BN254Scalar;
    use crate::prelude::*;

    #[test]
    fn test_b64() {
        let bytes = [0u8, 1, 2, 3, 250, 251, 252];
        let encoded = b64enc(&bytes);
        assert_eq!(b64dec(&encoded).unwrap(), bytes.to_vec());
        assert!(b64dec("%%%").is_err());
    }

    #[test]
    fn test_batch_inversion() {
        let mut prng = test_rng();
        let mut values: Vec<BN254Scalar> = (0..9).map(|_| BN254Scalar::random(&mut prng)).collect();
        values[3] = BN254Scalar::zero();
        let expected: Vec<BN254Scalar> = values
            .iter()
            .map(|v| v.inv().unwrap_or_else(|_| BN254Scalar::zero()))
            .collect();
        batch_inversion(&mut values);
        assert_eq!(values, expected);
    }

    #[test]
    fn test_powers() {
        let three = BN254Scalar::from(3u32);
        let p = powers(&three, 5);
        assert_eq!(p.len(), 5);
        assert_eq!(p[0], BN254Scalar::one());
        assert_eq!(p[4], BN254Scalar::from(81u32));
    }
}
