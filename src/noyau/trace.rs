// src/noyau/trace.rs
//
// Traceur : échantillonnage d’une fonction d’une variable.
//
// Règles:
// - l’arbre est analysé UNE fois (parse_only), puis évalué à chaque point
//   via evaluate_at avec une seule liaison (la variable du tracé) ;
// - erreur numérique en un point (division par zéro, domaine, dépassement)
//   => trou dans la courbe (y = None) ;
// - erreur structurelle (variable inconnue, fonction inconnue, arité)
//   => le tracé entier est refusé : elle se reproduirait à chaque point.

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::{debug, info};
use thiserror::Error;

use super::erreur::EvalError;
use super::eval::{evaluate_at, parse_only};
use super::expr::Expr;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlotError {
    #[error("intervalle invalide : [{min}, {max}]")]
    Intervalle { min: f64, max: f64 },

    #[error("au moins 2 points requis (reçu {0})")]
    Echantillons(usize),

    #[error(transparent)]
    Expression(#[from] EvalError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: Option<f64>,
}

/// Corps de fonction à tracer : `sin(x)` ou `y = sin(x)`.
/// Une affectation en tête est retirée (seul le membre droit est tracé).
pub fn parse_body(texte: &str) -> Result<Expr, PlotError> {
    match parse_only(texte)? {
        Expr::Assign(_, corps) => Ok(*corps),
        e => Ok(e),
    }
}

/// `n` points régulièrement espacés sur [x_min, x_max], bornes incluses.
pub fn sample(
    arbre: &Expr,
    var: &str,
    x_min: f64,
    x_max: f64,
    n: usize,
) -> Result<Vec<PlotPoint>, PlotError> {
    if !x_min.is_finite() || !x_max.is_finite() || x_min >= x_max {
        return Err(PlotError::Intervalle {
            min: x_min,
            max: x_max,
        });
    }
    if n < 2 {
        return Err(PlotError::Echantillons(n));
    }

    if !arbre.utilise(var) {
        debug!("tracé : {var} absent du corps, courbe constante");
    }

    let pas = (x_max - x_min) / (n - 1) as f64;
    let mut liaisons = HashMap::with_capacity(1);
    let mut points = Vec::with_capacity(n);

    for k in 0..n {
        // dernier point exactement sur x_max (pas d’accumulation d’erreur)
        let x = if k == n - 1 { x_max } else { x_min + pas * k as f64 };
        liaisons.insert(var.to_string(), x);
        let y = point(arbre, &liaisons)?;
        points.push(PlotPoint { x, y });
    }

    info!(
        "tracé {var} ∈ [{x_min}, {x_max}] : {} points, {} trous",
        n,
        points.iter().filter(|p| p.y.is_none()).count()
    );
    Ok(points)
}

/// Tracé polaire : θ ∈ [0, 2π], r = f(θ), point = (r cos θ, r sin θ).
/// Les trous sont conservés (None) pour couper la courbe au dessin.
pub fn sample_polar(
    arbre: &Expr,
    var: &str,
    n: usize,
) -> Result<Vec<Option<[f64; 2]>>, PlotError> {
    let rayons = sample(arbre, var, 0.0, TAU, n)?;
    Ok(rayons
        .into_iter()
        .map(|p| p.y.map(|r| [r * p.x.cos(), r * p.x.sin()]))
        .collect())
}

fn point(arbre: &Expr, liaisons: &HashMap<String, f64>) -> Result<Option<f64>, PlotError> {
    match evaluate_at(arbre, liaisons) {
        Ok(y) => Ok(Some(y)),
        Err(e) if e.est_structurelle() => Err(e.into()),
        Err(_) => Ok(None),
    }
}
