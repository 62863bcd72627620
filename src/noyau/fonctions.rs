// src/noyau/fonctions.rs
//
// Table des fonctions : nom -> (arité, implémentation).
// Lecture seule, initialisée une fois pour tout le processus.
//
// Chaque implémentation vérifie son domaine elle-même et renvoie une
// DomainError plutôt qu’un NaN silencieux.

use std::collections::HashMap;
use std::sync::OnceLock;

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use super::erreur::{EvalError, Resultat};

pub type Implementation = fn(&[f64]) -> Resultat<f64>;

#[derive(Clone, Copy)]
pub struct Fonction {
    pub arite: usize,
    pub eval: Implementation,
}

/// Mantisse f64 : au-delà de 53 bits significatifs, plus d’entier exact.
const BITS_MANTISSE: u64 = 53;

/// Constantes résolues à l’évaluation (jamais substituées dans le texte).
pub fn constante(nom: &str) -> Option<f64> {
    match nom {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

pub fn est_constante(nom: &str) -> bool {
    constante(nom).is_some()
}

static TABLE: OnceLock<HashMap<&'static str, Fonction>> = OnceLock::new();

pub fn fonction(nom: &str) -> Option<Fonction> {
    TABLE.get_or_init(construit_table).get(nom).copied()
}

/// Noms triés (pour l’aide / le pavé).
pub fn noms() -> Vec<&'static str> {
    let mut v: Vec<&'static str> = TABLE.get_or_init(construit_table).keys().copied().collect();
    v.sort_unstable();
    v
}

fn construit_table() -> HashMap<&'static str, Fonction> {
    let unaires: [(&'static str, Implementation); 21] = [
        ("sin", |a| Ok(a[0].sin())),
        ("cos", |a| Ok(a[0].cos())),
        ("tan", |a| Ok(a[0].tan())),
        ("asin", |a| borne("asin", a[0], -1.0, 1.0).map(f64::asin)),
        ("acos", |a| borne("acos", a[0], -1.0, 1.0).map(f64::acos)),
        ("atan", |a| Ok(a[0].atan())),
        ("sinh", |a| Ok(a[0].sinh())),
        ("cosh", |a| Ok(a[0].cosh())),
        ("tanh", |a| Ok(a[0].tanh())),
        ("asinh", |a| Ok(a[0].asinh())),
        ("acosh", |a| borne("acosh", a[0], 1.0, f64::INFINITY).map(f64::acosh)),
        ("atanh", |a| atanh(a[0])),
        ("sqrt", |a| borne("sqrt", a[0], 0.0, f64::INFINITY).map(f64::sqrt)),
        ("cbrt", |a| Ok(a[0].cbrt())),
        ("exp", |a| Ok(a[0].exp())),
        ("log", |a| strictement_positif("log", a[0]).map(f64::ln)),
        ("ln", |a| strictement_positif("ln", a[0]).map(f64::ln)),
        ("log10", |a| strictement_positif("log10", a[0]).map(f64::log10)),
        ("log2", |a| strictement_positif("log2", a[0]).map(f64::log2)),
        ("abs", |a| Ok(a[0].abs())),
        ("factorial", |a| factorielle(a[0])),
    ];

    let arrondis: [(&'static str, Implementation); 3] = [
        ("floor", |a| Ok(a[0].floor())),
        ("ceil", |a| Ok(a[0].ceil())),
        ("round", |a| Ok(a[0].round())),
    ];

    let binaires: [(&'static str, Implementation); 3] = [
        ("min", |a| Ok(a[0].min(a[1]))),
        ("max", |a| Ok(a[0].max(a[1]))),
        ("atan2", |a| Ok(a[0].atan2(a[1]))),
    ];

    let mut t = HashMap::new();
    for (nom, eval) in unaires.into_iter().chain(arrondis) {
        t.insert(nom, Fonction { arite: 1, eval });
    }
    for (nom, eval) in binaires {
        t.insert(nom, Fonction { arite: 2, eval });
    }
    t
}

fn borne(nom: &str, x: f64, min: f64, max: f64) -> Resultat<f64> {
    if x < min || x > max {
        return Err(EvalError::domain(nom, x));
    }
    Ok(x)
}

fn strictement_positif(nom: &str, x: f64) -> Resultat<f64> {
    if x <= 0.0 {
        return Err(EvalError::domain(nom, x));
    }
    Ok(x)
}

fn atanh(x: f64) -> Resultat<f64> {
    if x <= -1.0 || x >= 1.0 {
        return Err(EvalError::domain("atanh", x));
    }
    Ok(x.atanh())
}

/// n! pour n entier >= 0, calculé itérativement en BigInt.
///
/// Refuse (DomainError) dès que le produit n’est plus représentable
/// EXACTEMENT en f64 : partie impaire > 53 bits (22! est le dernier exact).
pub fn factorielle(x: f64) -> Resultat<f64> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(EvalError::domain("factorial", x));
    }

    let n = x as u64;
    let mut acc = BigInt::one();
    for k in 2..=n {
        acc *= k;
        if !exact_en_f64(&acc) {
            return Err(EvalError::domain("factorial", x));
        }
    }

    acc.to_f64().ok_or(EvalError::Overflow)
}

fn exact_en_f64(n: &BigInt) -> bool {
    if n.is_zero() {
        return true;
    }
    let zeros = n.trailing_zeros().unwrap_or(0);
    n.bits() - zeros <= BITS_MANTISSE
}
