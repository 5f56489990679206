use oprf_core::crypto::{self, PointFormat};
use oprf_core::oprf;
use oprf_core::types::*;

const PHONE: &[u8] = b"+15550000001";

#[test]
fn hash_to_group_deterministic() {
    let p1 = oprf::hash_to_group(PHONE).unwrap();
    let p2 = oprf::hash_to_group(PHONE).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn hash_to_group_different_inputs() {
    let p1 = oprf::hash_to_group(b"+15550000001").unwrap();
    let p2 = oprf::hash_to_group(b"+15550000002").unwrap();
    assert!(!p1.same_point(&p2));
}

#[test]
fn hash_to_group_output_decodes() {
    let point = oprf::hash_to_group(PHONE).unwrap();
    let decoded = crypto::decode_point(&point.to_bytes()).unwrap();
    assert_eq!(decoded, point);
}

#[test]
fn hash_to_group_empty_fails() {
    assert_eq!(oprf::hash_to_group(b""), Err(OprfError::InvalidInput));
}

#[test]
fn blind_randomized() {
    let (b1, s1) = oprf::blind(PHONE, PointFormat::Compressed).unwrap();
    let (b2, s2) = oprf::blind(PHONE, PointFormat::Compressed).unwrap();
    assert_ne!(s1, s2);
    assert_ne!(b1, b2);
}

#[test]
fn blind_respects_requested_format() {
    let (blinded, _) = oprf::blind(PHONE, PointFormat::Uncompressed).unwrap();
    assert_eq!(blinded.to_bytes().len(), UNCOMPRESSED_POINT_LENGTH);
}

#[test]
fn unblind_recovers_key_times_input_point() {
    let key = crypto::random_nonzero_scalar();
    let (blinded, blind_scalar) = oprf::blind(PHONE, PointFormat::Compressed).unwrap();
    let evaluated = oprf::evaluate(&blinded, &key).unwrap();

    let unblinded = oprf::unblind(&blind_scalar, &evaluated).unwrap();
    let expected = crypto::scalar_mult(&oprf::hash_to_group(PHONE).unwrap(), &key).unwrap();
    assert!(unblinded.same_point(&expected));
}

#[test]
fn output_independent_of_blinding() {
    let key = crypto::random_nonzero_scalar();

    let run = |format: PointFormat| {
        let (blinded, blind_scalar) = oprf::blind(PHONE, format).unwrap();
        let evaluated = oprf::evaluate(&blinded, &key).unwrap();
        oprf::finalize(PHONE, &blind_scalar, &evaluated).unwrap()
    };

    let first = run(PointFormat::Compressed);
    assert_eq!(first, run(PointFormat::Compressed));
    assert_eq!(first, run(PointFormat::Uncompressed));
}

#[test]
fn different_keys_different_output() {
    let (blinded, blind_scalar) = oprf::blind(PHONE, PointFormat::Compressed).unwrap();
    let key1 = crypto::random_nonzero_scalar();
    let key2 = crypto::random_nonzero_scalar();

    let out1 = oprf::finalize(PHONE, &blind_scalar, &oprf::evaluate(&blinded, &key1).unwrap()).unwrap();
    let out2 = oprf::finalize(PHONE, &blind_scalar, &oprf::evaluate(&blinded, &key2).unwrap()).unwrap();
    assert_ne!(out1, out2);
}

#[test]
fn different_inputs_different_output() {
    let key = crypto::random_nonzero_scalar();
    let run = |input: &[u8]| {
        let (blinded, blind_scalar) = oprf::blind(input, PointFormat::Compressed).unwrap();
        let evaluated = oprf::evaluate(&blinded, &key).unwrap();
        oprf::finalize(input, &blind_scalar, &evaluated).unwrap()
    };
    assert_ne!(run(b"+15550000001"), run(b"+15550000002"));
}

#[test]
fn finalize_empty_input_fails() {
    let blind_scalar = crypto::random_nonzero_scalar();
    let evaluated = crypto::scalarmult_base(&crypto::random_nonzero_scalar()).unwrap();
    assert_eq!(
        oprf::finalize(b"", &blind_scalar, &evaluated),
        Err(OprfError::InvalidInput)
    );
}
