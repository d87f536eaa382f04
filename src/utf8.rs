/*!
UTF-8 validation.

A single pass over the whole buffer that runs to completion (or fails)
strictly before the structural stages are trusted, since those stages assume
valid UTF-8 byte semantics for ASCII structural detection.

The vectorized implementation is the three-table nibble state machine: for
each byte, the high nibble of the previous byte, the low nibble of the
previous byte, and the high nibble of the current byte are looked up in three
16-entry tables whose bitwise AND yields an error vector. A second check
cross-references 3-byte and 4-byte lead thresholds against 2- and 3-byte
lookbacks to catch sequences that pass the 2-byte check but sit under a
longer lead. Lookback and incomplete-sequence state carries across 16-byte
lanes and 64-byte blocks as vectors, not per-byte state.

The fallback is `str::from_utf8`, which is also used to recover the exact
failing offset on the cold error path.
*/

use crate::error::{Error, Result};

/**
Validate that `input` is well-formed UTF-8.
*/
#[inline]
pub(crate) fn validate(input: &[u8]) -> Result<()> {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("ssse3") {
            // SAFETY: SSSE3 is available
            if unsafe { x86_64::validate(input) } {
                return Ok(());
            }

            return Err(invalid_at(input));
        }
    }

    match std::str::from_utf8(input) {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid_at(input)),
    }
}

#[cold]
fn invalid_at(input: &[u8]) -> Error {
    // the exact offset only matters on the error path, so recover it with
    // the scalar validator
    let offset = match std::str::from_utf8(input) {
        Err(e) => e.valid_up_to(),
        Ok(_) => input.len(),
    };

    Error::InvalidUtf8 { offset }
}

#[cfg(target_arch = "x86_64")]
mod x86_64 {
    use std::arch::x86_64::*;

    const TOO_SHORT: u8 = 1 << 0; // lead byte followed by another lead or ASCII
    const TOO_LONG: u8 = 1 << 1; // ASCII followed by a continuation
    const OVERLONG_3: u8 = 1 << 2; // E0 with a sub-A0 second byte
    const TOO_LARGE: u8 = 1 << 3; // F4 with an over-8F second byte
    const SURROGATE: u8 = 1 << 4; // ED with an over-9F second byte
    const OVERLONG_2: u8 = 1 << 5; // C0/C1
    const TOO_LARGE_1000: u8 = 1 << 6; // F5..FF leads
    const OVERLONG_4: u8 = 1 << 6; // F0 with a sub-90 second byte
    const TWO_CONTS: u8 = 1 << 7; // two continuations in a row
    const CARRY: u8 = TOO_SHORT | TOO_LONG | TWO_CONTS;

    struct State {
        error: __m128i,
        prev_input: __m128i,
        prev_incomplete: __m128i,
    }

    // SAFETY: Callers must ensure SSSE3 is available
    #[target_feature(enable = "ssse3")]
    pub(super) unsafe fn validate(input: &[u8]) -> bool {
        let mut state = State {
            error: _mm_setzero_si128(),
            prev_input: _mm_setzero_si128(),
            prev_incomplete: _mm_setzero_si128(),
        };

        let mut chunks = input.chunks_exact(64);
        for block in &mut chunks {
            check_block(&mut state, block.as_ptr());
        }

        let rest = chunks.remainder();
        if !rest.is_empty() {
            // zero padding is ASCII, so a sequence left open at the true end
            // of input still reads as too short
            let mut scratch = [0u8; 64];
            scratch[..rest.len()].copy_from_slice(rest);
            check_block(&mut state, scratch.as_ptr());
        }

        // a lead byte still waiting on continuations at end of input
        state.error = _mm_or_si128(state.error, state.prev_incomplete);

        _mm_movemask_epi8(_mm_cmpeq_epi8(state.error, _mm_setzero_si128())) == 0xFFFF
    }

    // SAFETY: Callers must ensure SSSE3 is available
    #[target_feature(enable = "ssse3")]
    #[inline]
    unsafe fn check_block(state: &mut State, ptr: *const u8) {
        let l0 = _mm_loadu_si128(ptr as *const __m128i);
        let l1 = _mm_loadu_si128(ptr.add(16) as *const __m128i);
        let l2 = _mm_loadu_si128(ptr.add(32) as *const __m128i);
        let l3 = _mm_loadu_si128(ptr.add(48) as *const __m128i);

        let any_high = _mm_movemask_epi8(_mm_or_si128(_mm_or_si128(l0, l1), _mm_or_si128(l2, l3)));

        if any_high == 0 {
            // pure ASCII: the only possible error is a sequence left open by
            // the previous block
            state.error = _mm_or_si128(state.error, state.prev_incomplete);
            state.prev_incomplete = _mm_setzero_si128();
            state.prev_input = l3;
            return;
        }

        check_lane(state, l0, state.prev_input);
        check_lane(state, l1, l0);
        check_lane(state, l2, l1);
        check_lane(state, l3, l2);

        state.prev_incomplete = is_incomplete(l3);
        state.prev_input = l3;
    }

    // SAFETY: Callers must ensure SSSE3 is available
    #[target_feature(enable = "ssse3")]
    #[inline]
    unsafe fn check_lane(state: &mut State, input: __m128i, prev_input: __m128i) {
        let prev1 = _mm_alignr_epi8(input, prev_input, 15);

        let sc = check_special_cases(input, prev1);
        let error = check_multibyte_lengths(input, prev_input, sc);

        state.error = _mm_or_si128(state.error, error);
    }

    /**
    The three-nibble-table lookup.

    Bits survive the AND only for byte pairs that violate one of the encoded
    rules (ASCII + continuation, lead + non-continuation, overlong, surrogate,
    beyond U+10FFFF).
    */
    // SAFETY: Callers must ensure SSSE3 is available
    #[target_feature(enable = "ssse3")]
    #[inline]
    unsafe fn check_special_cases(input: __m128i, prev1: __m128i) -> __m128i {
        #[rustfmt::skip]
        let byte_1_high = _mm_setr_epi8(
            // 0... ASCII leads
            TOO_LONG as i8, TOO_LONG as i8, TOO_LONG as i8, TOO_LONG as i8,
            TOO_LONG as i8, TOO_LONG as i8, TOO_LONG as i8, TOO_LONG as i8,
            // 10.. continuations
            TWO_CONTS as i8, TWO_CONTS as i8, TWO_CONTS as i8, TWO_CONTS as i8,
            // 1100 and 1101 two-byte leads
            (TOO_SHORT | OVERLONG_2) as i8, TOO_SHORT as i8,
            // 1110 three-byte leads
            (TOO_SHORT | OVERLONG_3 | SURROGATE) as i8,
            // 1111 four-byte leads and beyond
            (TOO_SHORT | TOO_LARGE | TOO_LARGE_1000 | OVERLONG_4) as i8,
        );

        #[rustfmt::skip]
        let byte_1_low = _mm_setr_epi8(
            (CARRY | OVERLONG_2 | OVERLONG_3 | OVERLONG_4) as i8, // x0: C0, E0, F0
            (CARRY | OVERLONG_2) as i8,                           // x1: C1
            CARRY as i8, CARRY as i8,                             // x2, x3
            (CARRY | TOO_LARGE) as i8,                            // x4: F4
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // x5
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // x6
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // x7
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // x8
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // x9
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // xA
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // xB
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // xC
            (CARRY | TOO_LARGE | TOO_LARGE_1000 | SURROGATE) as i8, // xD: ED
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // xE
            (CARRY | TOO_LARGE | TOO_LARGE_1000) as i8,           // xF
        );

        #[rustfmt::skip]
        let byte_2_high = _mm_setr_epi8(
            // 0... ASCII second byte
            TOO_SHORT as i8, TOO_SHORT as i8, TOO_SHORT as i8, TOO_SHORT as i8,
            TOO_SHORT as i8, TOO_SHORT as i8, TOO_SHORT as i8, TOO_SHORT as i8,
            // 10.. continuation second byte, split by which range checks apply
            (TOO_LONG | OVERLONG_2 | TWO_CONTS | OVERLONG_3 | TOO_LARGE_1000 | OVERLONG_4) as i8, // 8
            (TOO_LONG | OVERLONG_2 | TWO_CONTS | OVERLONG_3 | TOO_LARGE) as i8,                   // 9
            (TOO_LONG | OVERLONG_2 | TWO_CONTS | SURROGATE | TOO_LARGE) as i8,                    // A
            (TOO_LONG | OVERLONG_2 | TWO_CONTS | SURROGATE | TOO_LARGE) as i8,                    // B
            // 11.. lead second byte
            TOO_SHORT as i8, TOO_SHORT as i8, TOO_SHORT as i8, TOO_SHORT as i8,
        );

        let nibble_mask = _mm_set1_epi8(0x0f);

        let prev1_hi = _mm_and_si128(_mm_srli_epi16(prev1, 4), nibble_mask);
        let prev1_lo = _mm_and_si128(prev1, nibble_mask);
        let input_hi = _mm_and_si128(_mm_srli_epi16(input, 4), nibble_mask);

        _mm_and_si128(
            _mm_and_si128(
                _mm_shuffle_epi8(byte_1_high, prev1_hi),
                _mm_shuffle_epi8(byte_1_low, prev1_lo),
            ),
            _mm_shuffle_epi8(byte_2_high, input_hi),
        )
    }

    /**
    Cross-check 3-byte and 4-byte leads.

    `sc` carries the TWO_CONTS (0x80) bit wherever a continuation follows a
    continuation; that's only legal when a 3-byte lead sits two bytes back or
    a 4-byte lead three bytes back, and those leads in turn demand it.
    */
    // SAFETY: Callers must ensure SSSE3 is available
    #[target_feature(enable = "ssse3")]
    #[inline]
    unsafe fn check_multibyte_lengths(input: __m128i, prev_input: __m128i, sc: __m128i) -> __m128i {
        let prev2 = _mm_alignr_epi8(input, prev_input, 14);
        let prev3 = _mm_alignr_epi8(input, prev_input, 13);

        // only 111_.... leads give a nonzero saturating subtraction here
        let is_third_byte = _mm_subs_epu8(prev2, _mm_set1_epi8(0xdfu8 as i8));
        // only 1111.... leads
        let is_fourth_byte = _mm_subs_epu8(prev3, _mm_set1_epi8(0xefu8 as i8));

        // the subtraction results are tiny, so a signed greater-than-zero
        // compare is safe
        let must23 = _mm_cmpgt_epi8(
            _mm_or_si128(is_third_byte, is_fourth_byte),
            _mm_setzero_si128(),
        );
        let must23_80 = _mm_and_si128(must23, _mm_set1_epi8(0x80u8 as i8));

        _mm_xor_si128(must23_80, sc)
    }

    /**
    Lead bytes too close to the end of the lane to finish their sequence.
    */
    // SAFETY: Callers must ensure SSSE3 is available
    #[target_feature(enable = "ssse3")]
    #[inline]
    unsafe fn is_incomplete(input: __m128i) -> __m128i {
        #[rustfmt::skip]
        let max_value = _mm_setr_epi8(
            0xffu8 as i8, 0xffu8 as i8, 0xffu8 as i8, 0xffu8 as i8,
            0xffu8 as i8, 0xffu8 as i8, 0xffu8 as i8, 0xffu8 as i8,
            0xffu8 as i8, 0xffu8 as i8, 0xffu8 as i8, 0xffu8 as i8,
            0xffu8 as i8,
            (0xf0u8 - 1) as i8, (0xe0u8 - 1) as i8, (0xc0u8 - 1) as i8,
        );

        _mm_subs_epu8(input, max_value)
    }
}
