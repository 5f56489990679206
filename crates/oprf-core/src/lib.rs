// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

//! Core library for the Ecliptix phone-number OPRF.
//!
//! A relay holds one secret scalar per phone number and answers blinded
//! secp256k1 points with `k * alpha`, so the client can derive a stable
//! per-user secret without the relay ever seeing the phone-derived input.
//!
//! # Crate layout
//!
//! * [`types`] -- shared constants, the error taxonomy, and the identifier type.
//! * [`crypto`] -- secp256k1 point codec, secret scalars, CSPRNG and HMAC helpers.
//! * [`oprf`] -- blind / evaluate / unblind / finalize.
//! * [`protocol`] -- JSON request and response bodies.

/// secp256k1 point codec, secret scalars, and MAC helpers.
pub mod crypto;
/// Oblivious pseudo-random function over secp256k1.
pub mod oprf;
/// JSON bodies exchanged with clients.
pub mod protocol;
/// Shared constants, error types, and identifiers.
pub mod types;
