//! GF(256) arithmetic and Reed-Solomon encode/correct over the ECC 200 field.
//!
//! Primitive polynomial `0x12D`, matching the Data Matrix standard. Log and
//! antilog tables are built once behind a `lazy_static`, the way the teacher
//! crate precomputes its bit-table constants.

use lazy_static::lazy_static;

const PRIMITIVE_POLY: u16 = 0x12D;

struct Tables {
    log: [u8; 256],
    antilog: [u8; 256],
}

fn build_tables() -> Tables {
    let mut antilog = [0u8; 256];
    let mut log = [0u8; 256];

    let mut value: u16 = 1;
    for i in 0..255usize {
        antilog[i] = value as u8;
        log[value as usize] = i as u8;
        value <<= 1;
        if value & 0x100 != 0 {
            value ^= PRIMITIVE_POLY;
        }
    }
    antilog[255] = antilog[0];

    Tables { log, antilog }
}

lazy_static! {
    static ref TABLES: Tables = build_tables();
}

pub fn gf_log(a: u8) -> u8 {
    debug_assert!(a != 0, "log(0) is undefined");
    TABLES.log[a as usize]
}

pub fn gf_antilog(e: i32) -> u8 {
    let idx = ((e % 255) + 255) % 255;
    TABLES.antilog[idx as usize]
}

pub fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    gf_antilog(gf_log(a) as i32 + gf_log(b) as i32)
}

pub fn gf_div(a: u8, b: u8) -> u8 {
    debug_assert!(b != 0, "division by zero in GF(256)");
    if a == 0 {
        return 0;
    }
    gf_antilog(gf_log(a) as i32 - gf_log(b) as i32)
}

pub fn gf_inv(a: u8) -> u8 {
    debug_assert!(a != 0, "0 has no inverse");
    gf_antilog(-(gf_log(a) as i32))
}

pub fn gf_add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Generator polynomial of degree `ecc_words`, coefficients highest-degree first,
/// with an implicit leading 1: `g(x) = prod_{i=1..ecc_words} (x - a^i)`.
pub fn generator_poly(ecc_words: usize) -> Vec<u8> {
    let mut g = vec![1u8];
    for i in 1..=ecc_words {
        let root = gf_antilog(i as i32);
        let mut next = vec![0u8; g.len() + 1];
        for (j, &coef) in g.iter().enumerate() {
            next[j] = gf_add(next[j], coef);
            next[j + 1] = gf_add(next[j + 1], gf_mul(coef, root));
        }
        g = next;
    }
    g
}

/// Appends `ecc_words` Reed-Solomon error codewords after `data`, systematic form.
pub fn rs_encode_block(data: &[u8], ecc_words: usize) -> Vec<u8> {
    let generator = generator_poly(ecc_words);
    let mut remainder = vec![0u8; ecc_words];

    for &byte in data {
        let feedback = gf_add(byte, remainder[0]);
        for i in 0..ecc_words - 1 {
            remainder[i] = gf_add(remainder[i + 1], gf_mul(feedback, generator[generator.len() - 1 - i]));
        }
        remainder[ecc_words - 1] = gf_mul(feedback, generator[0]);
    }

    let mut out = data.to_vec();
    out.extend(remainder);
    out
}

#[derive(Debug)]
pub enum RsError {
    /// Syndromes indicate errors but no error-locator of bounded degree was found.
    LocatorNotFound,
    /// Chien search produced more roots than the block can correct, or an out-of-range root.
    TooManyErrors,
    /// Repair completed but the resulting syndromes are still nonzero.
    RepairFailed,
}

/// Corrects `block` (data || error words) in place. Returns `Ok(true)` if the
/// block already had zero syndromes, `Ok(false)` if errors were corrected.
pub fn rs_correct_block(block: &mut [u8], ecc_words: usize, max_correctable: usize) -> Result<bool, RsError> {
    let syndromes = compute_syndromes(block, ecc_words);
    if syndromes.iter().all(|&s| s == 0) {
        return Ok(true);
    }

    let locator = berlekamp_massey(&syndromes, max_correctable)?;
    let error_positions = chien_search(&locator, block.len())?;

    if error_positions.len() != (locator.len() - 1) {
        return Err(RsError::TooManyErrors);
    }

    forney_correct(block, &syndromes, &locator, &error_positions);

    let verify = compute_syndromes(block, ecc_words);
    if verify.iter().all(|&s| s == 0) {
        Ok(false)
    } else {
        Err(RsError::RepairFailed)
    }
}

fn compute_syndromes(block: &[u8], ecc_words: usize) -> Vec<u8> {
    (1..=ecc_words)
        .map(|j| {
            let root = gf_antilog(j as i32);
            let mut acc = 0u8;
            let mut power = 1u8;
            // block is ordered highest-degree-coefficient-first (data then error words);
            // evaluate r(alpha^j) via Horner from the last element backward.
            for &coef in block.iter().rev() {
                acc = gf_add(gf_mul(acc, root), coef);
                let _ = power;
            }
            acc
        })
        .collect()
}

/// Error-locator polynomial, coefficients lowest-degree first with `locator[0] == 1`.
fn berlekamp_massey(syndromes: &[u8], max_correctable: usize) -> Result<Vec<u8>, RsError> {
    let mut c = vec![1u8]; // current locator
    let mut b = vec![1u8]; // previous locator
    let mut l = 0usize;
    let mut m = 1i32;
    let mut bb = 1u8;

    for n in 0..syndromes.len() {
        let mut delta = syndromes[n];
        for i in 1..=l {
            if i < c.len() {
                delta = gf_add(delta, gf_mul(c[i], syndromes[n - i]));
            }
        }

        if delta == 0 {
            m += 1;
        } else if 2 * l <= n {
            let t = c.clone();
            let coef = gf_div(delta, bb);
            shift_add(&mut c, &b, coef, m as usize);
            l = n + 1 - l;
            b = t;
            bb = delta;
            m = 1;
        } else {
            let coef = gf_div(delta, bb);
            shift_add(&mut c, &b, coef, m as usize);
            m += 1;
        }
    }

    if l > max_correctable {
        return Err(RsError::LocatorNotFound);
    }

    c.truncate(l + 1);
    Ok(c)
}

fn shift_add(c: &mut Vec<u8>, b: &[u8], coef: u8, shift: usize) {
    let needed = shift + b.len();
    if c.len() < needed {
        c.resize(needed, 0);
    }
    for (i, &bi) in b.iter().enumerate() {
        c[i + shift] = gf_add(c[i + shift], gf_mul(coef, bi));
    }
}

/// Returns codeword indices (0 = first/highest-degree element) whose roots
/// satisfy the locator polynomial, via brute-force evaluation (Chien search).
fn chien_search(locator: &[u8], block_len: usize) -> Result<Vec<usize>, RsError> {
    let degree = locator.len() - 1;
    if degree == 0 {
        return Ok(Vec::new());
    }

    let mut positions = Vec::new();
    for i in 0..block_len {
        // Root alpha^-i corresponds to error at position i counted from the end.
        let x_inv = gf_antilog(-(i as i32));
        let mut acc = 0u8;
        for (j, &coef) in locator.iter().enumerate() {
            acc = gf_add(acc, gf_mul(coef, gf_pow(x_inv, j as i32)));
        }
        if acc == 0 {
            positions.push(block_len - 1 - i);
        }
    }

    if positions.len() != degree {
        return Err(RsError::TooManyErrors);
    }
    Ok(positions)
}

fn gf_pow(a: u8, e: i32) -> u8 {
    if a == 0 {
        return if e == 0 { 1 } else { 0 };
    }
    gf_antilog(gf_log(a) as i32 * e)
}

fn forney_correct(block: &mut [u8], syndromes: &[u8], locator: &[u8], error_positions: &[usize]) {
    let n = block.len();
    // Error evaluator: omega(x) = [S(x) * Lambda(x)] mod x^(ecc_words)
    let ecc_words = syndromes.len();
    let mut omega = vec![0u8; ecc_words];
    for i in 0..ecc_words {
        let mut acc = 0u8;
        for j in 0..locator.len() {
            if i >= j {
                acc = gf_add(acc, gf_mul(locator[j], syndromes[i - j]));
            }
        }
        omega[i] = acc;
    }

    // Formal derivative of locator (odd-degree terms survive in char-2 fields).
    let mut lambda_prime = Vec::new();
    for i in (1..locator.len()).step_by(2) {
        lambda_prime.push(locator[i]);
    }

    for &pos in error_positions {
        let i = n - 1 - pos;
        let x_inv = gf_antilog(-(i as i32));

        let mut omega_val = 0u8;
        for (j, &coef) in omega.iter().enumerate() {
            omega_val = gf_add(omega_val, gf_mul(coef, gf_pow(x_inv, j as i32)));
        }

        let mut lambda_prime_val = 0u8;
        for (j, &coef) in lambda_prime.iter().enumerate() {
            lambda_prime_val = gf_add(lambda_prime_val, gf_mul(coef, gf_pow(x_inv, (2 * j) as i32)));
        }

        if lambda_prime_val == 0 {
            continue;
        }

        let magnitude = gf_mul(gf_pow(x_inv, 0), gf_div(omega_val, lambda_prime_val));
        block[pos] = gf_add(block[pos], magnitude);
    }
}

/// Splits `data` (with `error_words` appended per-symbol) into `blocks`
/// interleaved blocks, round-robin by codeword position, matching the
/// standard's round-robin distribution for multi-block symbols.
pub fn deinterleave(codewords: &[u8], blocks: usize, block_error_words: usize) -> Vec<Vec<u8>> {
    let total = codewords.len();
    let mut out = vec![Vec::new(); blocks];
    for (i, &cw) in codewords.iter().enumerate() {
        out[i % blocks].push(cw);
    }
    debug_assert!(total >= blocks * block_error_words || blocks == 1);
    out
}

/// Inverse of [`deinterleave`]: recombines `blocks` (data+error each) into one
/// round-robin codeword stream of the original symbol length.
pub fn interleave(blocks: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = blocks.iter().map(|b| b.len()).sum();
    let mut out = Vec::with_capacity(total);
    let max_len = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    for i in 0..max_len {
        for block in blocks {
            if let Some(&cw) = block.get(i) {
                out.push(cw);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_antilog_are_inverses() {
        for a in 1..=255u8 {
            assert_eq!(gf_antilog(gf_log(a) as i32), a);
        }
    }

    #[test]
    fn mul_div_roundtrip() {
        for a in 1..=255u8 {
            for b in 1..=255u8 {
                assert_eq!(gf_div(gf_mul(a, b), b), a);
            }
        }
    }

    #[test]
    fn encode_produces_clean_syndromes() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let ecc_words = 5;
        let block = rs_encode_block(&data, ecc_words);
        let syndromes = compute_syndromes(&block, ecc_words);
        assert!(syndromes.iter().all(|&s| s == 0));
    }

    #[test]
    fn corrects_single_byte_error() {
        let data = [10u8, 20, 30, 40, 50, 60, 70, 80];
        let ecc_words = 5;
        let mut block = rs_encode_block(&data, ecc_words);
        let original = block.clone();

        block[3] ^= 0xFF;

        let result = rs_correct_block(&mut block, ecc_words, ecc_words / 2);
        assert!(matches!(result, Ok(false)));
        assert_eq!(block, original);
    }

    #[test]
    fn clean_block_reports_no_correction_needed() {
        let data = [1u8, 2, 3];
        let ecc_words = 7;
        let mut block = rs_encode_block(&data, ecc_words);
        let result = rs_correct_block(&mut block, ecc_words, ecc_words / 2);
        assert!(matches!(result, Ok(true)));
    }

    #[test]
    fn interleave_deinterleave_roundtrip() {
        let codewords: Vec<u8> = (0..20).collect();
        let blocks = deinterleave(&codewords, 4, 2);
        let back = interleave(&blocks);
        assert_eq!(back, codewords);
    }
}
