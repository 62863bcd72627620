//! Session : variables + mémoire (M+/M-/MR/MC) + dernière réponse.
//!
//! Contrats :
//! - Aucun état global : deux sessions ne se voient pas (tests, onglets…).
//! - Toutes les opérations sont totales et ne touchent que leur propre case.
//! - Seuls mutateurs : affectation, opérations mémoire, évaluation réussie.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::erreur::{EvalError, Resultat};
use super::format::Precision;

/// Portée de lecture/écriture vue par l’évaluateur.
///
/// Implémentée par la session (évaluation d’une ligne) et par la surcouche
/// éphémère du traceur (une liaison par point, rien ne fuit).
pub trait Portee {
    fn variable(&self, nom: &str) -> Option<f64>;
    fn affecter(&mut self, nom: &str, valeur: f64);
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    variables: BTreeMap<String, f64>,
    memoire: f64,
    derniere_reponse: f64,
    pub precision: Precision,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_variable(&self, nom: &str) -> Option<f64> {
        self.variables.get(nom).copied()
    }

    pub fn set_variable(&mut self, nom: &str, valeur: f64) {
        debug!("session: {nom} = {valeur}");
        self.variables.insert(nom.to_string(), valeur);
    }

    /// Variables triées par nom (panneau UI).
    pub fn variables(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// M+ : une somme non finie => Overflow, mémoire inchangée.
    pub fn memory_add(&mut self, valeur: f64) -> Resultat<()> {
        self.memoire = cumul(self.memoire + valeur)?;
        debug!("mémoire += {valeur} -> {}", self.memoire);
        Ok(())
    }

    pub fn memory_subtract(&mut self, valeur: f64) -> Resultat<()> {
        self.memoire = cumul(self.memoire - valeur)?;
        debug!("mémoire -= {valeur} -> {}", self.memoire);
        Ok(())
    }

    pub fn memory_read(&self) -> f64 {
        self.memoire
    }

    pub fn memory_clear(&mut self) {
        self.memoire = 0.0;
    }

    pub fn recall_last_answer(&self) -> f64 {
        self.derniere_reponse
    }

    pub fn record_last_answer(&mut self, valeur: f64) {
        self.derniere_reponse = valeur;
    }

    /// Effacement explicite : variables + mémoire + dernière réponse.
    /// La précision (réglage d’affichage) est conservée.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.memoire = 0.0;
        self.derniere_reponse = 0.0;
    }
}

fn cumul(v: f64) -> Resultat<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EvalError::Overflow)
    }
}

impl Portee for Session {
    fn variable(&self, nom: &str) -> Option<f64> {
        self.get_variable(nom)
    }

    fn affecter(&mut self, nom: &str, valeur: f64) {
        self.set_variable(nom, valeur);
    }
}

/// Table de liaisons nue (ex: `{"x": 0.5}` fournie par le traceur).
impl Portee for HashMap<String, f64> {
    fn variable(&self, nom: &str) -> Option<f64> {
        self.get(nom).copied()
    }

    fn affecter(&mut self, nom: &str, valeur: f64) {
        self.insert(nom.to_string(), valeur);
    }
}

/// Surcouche éphémère : lit d’abord ses propres liaisons, puis la base.
/// Les affectations restent dans la surcouche (jetée après l’appel) :
/// la base n’est jamais modifiée.
pub struct Surcouche<'a> {
    base: &'a dyn Portee,
    locales: HashMap<String, f64>,
}

impl<'a> Surcouche<'a> {
    pub fn new(base: &'a dyn Portee) -> Self {
        Self {
            base,
            locales: HashMap::new(),
        }
    }
}

impl Portee for Surcouche<'_> {
    fn variable(&self, nom: &str) -> Option<f64> {
        self.locales
            .get(nom)
            .copied()
            .or_else(|| self.base.variable(nom))
    }

    fn affecter(&mut self, nom: &str, valeur: f64) {
        self.locales.insert(nom.to_string(), valeur);
    }
}
