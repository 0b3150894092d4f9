use crate::errors::{HonkError, Result};
use crate::polynomials::univariate::Univariate;
use honk_algebra::{
    bn254::{BN254Scalar, BN254G1},
    prelude::*,
};
use merlin::Transcript;
use rand_chacha::ChaChaRng;

/// A value with a fixed-width byte encoding that can travel through the proof.
pub trait TranscriptElement: Sized {
    /// The number of bytes of the encoding.
    const TRANSCRIPT_SIZE: usize;

    /// Convert to the transcript encoding.
    fn to_transcript_bytes(&self) -> Vec<u8>;

    /// Decode from exactly `TRANSCRIPT_SIZE` bytes.
    fn from_transcript_bytes(bytes: &[u8]) -> Result<Self>;
}

impl TranscriptElement for u64 {
    const TRANSCRIPT_SIZE: usize = 8;

    fn to_transcript_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn from_transcript_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; 8] = bytes.try_into().map_err(|_| HonkError::TranscriptError)?;
        Ok(u64::from_be_bytes(array))
    }
}

impl TranscriptElement for BN254Scalar {
    const TRANSCRIPT_SIZE: usize = honk_algebra::bn254::BN254_SCALAR_LEN;

    fn to_transcript_bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn from_transcript_bytes(bytes: &[u8]) -> Result<Self> {
        BN254Scalar::from_bytes(bytes).map_err(|_| HonkError::TranscriptError)
    }
}

impl TranscriptElement for BN254G1 {
    const TRANSCRIPT_SIZE: usize = BN254G1::COMPRESSED_LEN;

    fn to_transcript_bytes(&self) -> Vec<u8> {
        self.to_compressed_bytes()
    }

    fn from_transcript_bytes(bytes: &[u8]) -> Result<Self> {
        BN254G1::from_compressed_bytes(bytes).map_err(|_| HonkError::TranscriptError)
    }
}

/// The Fiat-Shamir transcript of one proof.
///
/// The prover appends every message to `proof_data` while absorbing it into the
/// merlin sponge; the verifier replays the same byte buffer sequentially. Both sides
/// derive identical challenges as long as they send, receive and challenge in the same
/// order under the same labels.
pub struct HonkTranscript {
    transcript: Transcript,
    proof_data: Vec<u8>,
    read_offset: usize,
}

impl HonkTranscript {
    /// Start an empty prover transcript.
    pub fn new(label: &'static [u8]) -> Self {
        Self {
            transcript: Transcript::new(label),
            proof_data: Vec::new(),
            read_offset: 0,
        }
    }

    /// Start a verifier transcript reading from `proof_data`.
    pub fn from_proof(label: &'static [u8], proof_data: Vec<u8>) -> Self {
        Self {
            transcript: Transcript::new(label),
            proof_data,
            read_offset: 0,
        }
    }

    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        self.transcript.append_message(b"label", label.as_bytes());
        self.transcript.append_message(b"element", bytes);
    }

    /// Append a prover message.
    pub fn send_to_verifier<T: TranscriptElement>(&mut self, label: &str, element: &T) {
        let bytes = element.to_transcript_bytes();
        self.absorb(label, &bytes);
        self.proof_data.extend_from_slice(&bytes);
    }

    /// Append a sequence of prover messages under one label.
    pub fn send_all_to_verifier<T: TranscriptElement>(&mut self, label: &str, elements: &[T]) {
        let mut bytes = Vec::with_capacity(elements.len() * T::TRANSCRIPT_SIZE);
        for e in elements {
            bytes.extend(e.to_transcript_bytes());
        }
        self.absorb(label, &bytes);
        self.proof_data.extend_from_slice(&bytes);
    }

    /// Append the evaluations of a univariate.
    pub fn send_univariate<F: Scalar + TranscriptElement>(
        &mut self,
        label: &str,
        univariate: &Univariate<F>,
    ) {
        self.send_all_to_verifier(label, &univariate.evaluations);
    }

    fn take_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let end = self.read_offset + len;
        if end > self.proof_data.len() {
            return Err(HonkError::TranscriptError);
        }
        let bytes = self.proof_data[self.read_offset..end].to_vec();
        self.read_offset = end;
        Ok(bytes)
    }

    /// Read the next prover message.
    pub fn receive_from_prover<T: TranscriptElement>(&mut self, label: &str) -> Result<T> {
        let bytes = self.take_bytes(T::TRANSCRIPT_SIZE)?;
        self.absorb(label, &bytes);
        T::from_transcript_bytes(&bytes)
    }

    /// Read `count` prover messages sent under one label.
    pub fn receive_all_from_prover<T: TranscriptElement>(
        &mut self,
        label: &str,
        count: usize,
    ) -> Result<Vec<T>> {
        let bytes = self.take_bytes(count * T::TRANSCRIPT_SIZE)?;
        self.absorb(label, &bytes);
        bytes
            .chunks(T::TRANSCRIPT_SIZE)
            .map(T::from_transcript_bytes)
            .collect()
    }

    /// Read a univariate with `length` evaluations.
    pub fn receive_univariate<F: Scalar + TranscriptElement>(
        &mut self,
        label: &str,
        length: usize,
    ) -> Result<Univariate<F>> {
        Ok(Univariate::new(self.receive_all_from_prover(label, length)?))
    }

    /// Derive a field challenge.
    pub fn get_challenge<F: Scalar>(&mut self, label: &str) -> F {
        self.transcript
            .append_message(b"challenge label", label.as_bytes());
        let mut buff = [0u8; 32];
        self.transcript.challenge_bytes(b"challenge", &mut buff);
        F::random(&mut ChaChaRng::from_seed(buff))
    }

    /// Derive one challenge per label, in order.
    pub fn get_challenges<F: Scalar, S: AsRef<str>>(&mut self, labels: &[S]) -> Vec<F> {
        labels
            .iter()
            .map(|l| self.get_challenge(l.as_ref()))
            .collect()
    }

    /// The bytes sent so far.
    pub fn proof_data(&self) -> &[u8] {
        &self.proof_data
    }

    /// Whether a verifier has consumed the whole proof.
    pub fn is_consumed(&self) -> bool {
        self.read_offset == self.proof_data.len()
    }

    /// Finish the transcript and return the proof bytes.
    pub fn export_proof(self) -> Vec<u8> {
        self.proof_data
    }
}
