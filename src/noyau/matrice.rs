// src/noyau/matrice.rs
//
// Onglet matrices : grille texte -> DMatrix -> opération -> texte.
//
// Grille : lignes séparées par un saut de ligne ou ';', cases par ','
// (hors parenthèses : les arguments de max(1, 2) restent dans la case).
// Chaque case est une EXPRESSION évaluée par le noyau (sans variables de
// session) : "sqrt(2), pi/2" est accepté, "abc" est refusé proprement.

use std::collections::HashMap;

use log::info;
use nalgebra::DMatrix;
use thiserror::Error;

use super::erreur::EvalError;
use super::eval::{evaluate_at, parse_only};
use super::format::{format_value, Precision};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum MatrixError {
    #[error("matrice vide")]
    Vide,

    #[error("ligne {ligne} : {trouve} case(s), {attendu} attendue(s)")]
    LignesInegales {
        ligne: usize,
        attendu: usize,
        trouve: usize,
    },

    #[error("case ({ligne}, {colonne}) : {source}")]
    Entree {
        ligne: usize,
        colonne: usize,
        #[source]
        source: EvalError,
    },

    #[error("{op} : dimensions incompatibles {a:?} et {b:?}")]
    Dimensions {
        op: OpMatrice,
        a: (usize, usize),
        b: (usize, usize),
    },

    #[error("{0} : matrice carrée requise")]
    NonCarree(OpMatrice),

    #[error("matrice singulière : pas d’inverse")]
    Singuliere,

    #[error("{0} : matrice B requise")]
    OperandeManquante(OpMatrice),

    #[error(transparent)]
    Format(#[from] EvalError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpMatrice {
    Addition,
    Soustraction,
    Produit,
    Determinant,
    Inverse,
    Transposee,
}

impl OpMatrice {
    pub const TOUTES: [OpMatrice; 6] = [
        OpMatrice::Addition,
        OpMatrice::Soustraction,
        OpMatrice::Produit,
        OpMatrice::Determinant,
        OpMatrice::Inverse,
        OpMatrice::Transposee,
    ];

    /// Les opérations binaires lisent aussi la grille B.
    pub fn binaire(self) -> bool {
        matches!(
            self,
            OpMatrice::Addition | OpMatrice::Soustraction | OpMatrice::Produit
        )
    }
}

impl std::fmt::Display for OpMatrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OpMatrice::Addition => "A + B",
            OpMatrice::Soustraction => "A − B",
            OpMatrice::Produit => "A × B",
            OpMatrice::Determinant => "det(A)",
            OpMatrice::Inverse => "A⁻¹",
            OpMatrice::Transposee => "Aᵀ",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultatMatrice {
    Matrice(DMatrix<f64>),
    Scalaire(f64),
}

/// Lit une grille texte (cases = expressions).
pub fn parse_matrice(texte: &str) -> Result<DMatrix<f64>, MatrixError> {
    let vide = HashMap::new();
    let mut lignes: Vec<Vec<f64>> = Vec::new();

    for brute in texte.split(['\n', ';']) {
        let brute = brute.trim();
        if brute.is_empty() {
            continue;
        }

        let ligne = lignes.len() + 1;
        let mut valeurs = Vec::new();
        for (k, case) in cases(brute).into_iter().enumerate() {
            let v = parse_only(case)
                .and_then(|arbre| evaluate_at(&arbre, &vide))
                .map_err(|source| MatrixError::Entree {
                    ligne,
                    colonne: k + 1,
                    source,
                })?;
            valeurs.push(v);
        }

        if let Some(premiere) = lignes.first() {
            if premiere.len() != valeurs.len() {
                return Err(MatrixError::LignesInegales {
                    ligne,
                    attendu: premiere.len(),
                    trouve: valeurs.len(),
                });
            }
        }
        lignes.push(valeurs);
    }

    let nl = lignes.len();
    let nc = lignes.first().map(Vec::len).ok_or(MatrixError::Vide)?;
    let plat: Vec<f64> = lignes.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(nl, nc, &plat))
}

/// Découpe une ligne sur les ',' hors parenthèses : "max(1, 2), 3" => 2 cases.
fn cases(ligne: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut profondeur = 0usize;
    let mut debut = 0;

    for (i, c) in ligne.char_indices() {
        match c {
            '(' => profondeur += 1,
            ')' => profondeur = profondeur.saturating_sub(1),
            ',' if profondeur == 0 => {
                out.push(&ligne[debut..i]);
                debut = i + 1;
            }
            _ => {}
        }
    }
    out.push(&ligne[debut..]);
    out
}

pub fn calcule(
    op: OpMatrice,
    a: &DMatrix<f64>,
    b: Option<&DMatrix<f64>>,
) -> Result<ResultatMatrice, MatrixError> {
    let dims = |m: &DMatrix<f64>| (m.nrows(), m.ncols());

    let r = match op {
        OpMatrice::Addition | OpMatrice::Soustraction | OpMatrice::Produit => {
            let b = b.ok_or(MatrixError::OperandeManquante(op))?;
            let compatibles = match op {
                OpMatrice::Produit => a.ncols() == b.nrows(),
                _ => a.shape() == b.shape(),
            };
            if !compatibles {
                return Err(MatrixError::Dimensions {
                    op,
                    a: dims(a),
                    b: dims(b),
                });
            }
            let m = match op {
                OpMatrice::Addition => a + b,
                OpMatrice::Soustraction => a - b,
                _ => a * b,
            };
            ResultatMatrice::Matrice(m)
        }

        OpMatrice::Determinant => {
            if !a.is_square() {
                return Err(MatrixError::NonCarree(op));
            }
            ResultatMatrice::Scalaire(a.determinant())
        }

        OpMatrice::Inverse => {
            if !a.is_square() {
                return Err(MatrixError::NonCarree(op));
            }
            let inv = a.clone().try_inverse().ok_or(MatrixError::Singuliere)?;
            // pivot quasi nul : coefficients non finis => singulière aussi
            if inv.iter().any(|v| !v.is_finite()) {
                return Err(MatrixError::Singuliere);
            }
            ResultatMatrice::Matrice(inv)
        }

        OpMatrice::Transposee => ResultatMatrice::Matrice(a.transpose()),
    };

    info!("matrices : {op} sur {:?}", dims(a));
    Ok(r)
}

/// Rendu texte, colonnes alignées à droite.
pub fn format_resultat(r: &ResultatMatrice, precision: Precision) -> Result<String, MatrixError> {
    let m = match r {
        ResultatMatrice::Scalaire(v) => return Ok(format_value(*v, precision)?),
        ResultatMatrice::Matrice(m) => m,
    };

    let mut cases: Vec<Vec<String>> = Vec::with_capacity(m.nrows());
    for i in 0..m.nrows() {
        let ligne = (0..m.ncols())
            .map(|j| format_value(m[(i, j)], precision))
            .collect::<Result<Vec<_>, _>>()?;
        cases.push(ligne);
    }

    let largeur = cases
        .iter()
        .flatten()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0);

    Ok(cases
        .iter()
        .map(|ligne| {
            ligne
                .iter()
                .map(|s| format!("{s:>largeur$}"))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
