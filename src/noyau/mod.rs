//! Noyau : évaluateur arithmétique sûr
//!
//! Organisation interne :
//! - jetons.rs    : tokenisation (positions en caractères)
//! - analyse.rs   : descente récursive + construction Expr
//! - expr.rs      : arbre + rendu parenthésé
//! - fonctions.rs : table des fonctions, constantes, factorielle exacte
//! - eval.rs      : évaluateur + points d’entrée
//! - session.rs   : variables, mémoire, dernière réponse, précision
//! - format.rs    : affichage complet / N décimales
//! - erreur.rs    : taxonomie des erreurs
//! - trace.rs     : échantillonnage pour le traceur
//! - matrice.rs   : onglet matrices (nalgebra)

pub mod analyse;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod matrice;
pub mod session;
pub mod trace;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;
