// src/noyau/format.rs
//
// Affichage d’un résultat numérique.
// - Complete   : forme la plus courte qui relit EXACTEMENT le même f64
// - Decimales(n) : virgule fixe, arrondi exact à n chiffres (demi loin de zéro)
//
// L’arrondi passe par le rationnel exact du f64 (pas de double arrondi binaire).
// Une valeur non finie est refusée : on n’affiche jamais "NaN" / "inf".

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

use super::erreur::{EvalError, Resultat};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    #[default]
    Complete,
    Decimales(usize),
}

/// Borne des décimales : au-delà, `Decimales(n)` est ramené à cette valeur.
pub const DECIMALES_MAX: usize = 200;

pub fn format_value(v: f64, precision: Precision) -> Resultat<String> {
    if !v.is_finite() {
        return Err(EvalError::Format);
    }

    match precision {
        // -0 => "0"
        Precision::Complete if v == 0.0 => Ok("0".to_string()),
        Precision::Complete => Ok(format!("{v}")),
        Precision::Decimales(digits) => {
            let digits = digits.min(DECIMALES_MAX);
            let r = BigRational::from_float(v).ok_or(EvalError::Format)?;
            Ok(scaled_to_decimal(rational_rounded(&r, digits), digits))
        }
    }
}

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    // n <= DECIMALES_MAX : la conversion est exacte
    BigInt::from(10).pow(n as u32)
}

/// r -> entier “scalé” = round(r * 10^digits), demi loin de zéro.
fn rational_rounded(r: &BigRational, digits: usize) -> BigInt {
    let scale = pow10(digits);
    let d = r.denom();
    let n = r.numer().abs() * scale;
    let deux = BigInt::from(2);
    // floor(x + 1/2) = floor((2n + d) / 2d)
    let abs = (&n * &deux + d) / (d * &deux);
    if r.is_negative() {
        -abs
    } else {
        abs
    }
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal.
fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    // -0.001 arrondi à 0.00 : scaled vaut 0, donc pas de signe
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;
    let signe = if neg { "-" } else { "" };

    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}
