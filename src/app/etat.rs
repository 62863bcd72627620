//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, résultat, erreur, historique,
//! traceur, matrices) et offrir des opérations simples (C/CLR/AC) sans logique
//! d’affichage.
//!
//! Contrats :
//! - Aucune analyse ici : les appels au noyau vivent dans vue.rs.
//! - Actions déterministes, sans effet de bord caché.
//! - Bornes sur la précision (anti-abus / anti-gel).

use crate::noyau::format::{self, format_value, Precision};
use crate::noyau::matrice::OpMatrice;
use crate::noyau::session::Session;
use crate::noyau::trace::PlotPoint;

/// Décimales proposées quand on quitte le mode “complet”.
pub const DECIMALES_DEFAUT: usize = 6;

/// Garde-fou : on borne la précision (même borne que le formateur).
pub const DECIMALES_MAX: usize = format::DECIMALES_MAX;

/// Traceur : intervalle et échantillonnage par défaut.
pub const TRACE_X_MIN: f64 = -10.0;
pub const TRACE_X_MAX: f64 = 10.0;
pub const TRACE_ECHANTILLONS: usize = 500;
pub const TRACE_ECHANTILLONS_MAX: usize = 5000;

/// Précision d’affichage de l’onglet matrices.
pub const MATRICE_DECIMALES: usize = 4;

/// Historique borné (les plus anciennes lignes tombent).
const HISTORIQUE_MAX: usize = 200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Onglet {
    #[default]
    Calculatrice,
    Graphe,
    Matrices,
}

#[derive(Clone, Default, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub arbre: String,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LigneHistorique {
    pub entree: String,
    pub affichage: String,
}

#[derive(Clone, Debug)]
pub struct EtatGraphe {
    pub texte: String,
    pub polaire: bool,
    pub x_min: f64,
    pub x_max: f64,
    pub echantillons: usize,
    /// Courbe cartésienne ou polaire, déjà en coordonnées (x, y) ; None = trou.
    pub points: Vec<Option<[f64; 2]>>,
    pub erreur: String,
}

impl Default for EtatGraphe {
    fn default() -> Self {
        Self {
            texte: "y = sin(x)".to_string(),
            polaire: false,
            x_min: TRACE_X_MIN,
            x_max: TRACE_X_MAX,
            echantillons: TRACE_ECHANTILLONS,
            points: Vec::new(),
            erreur: String::new(),
        }
    }
}

impl EtatGraphe {
    pub fn set_points_cartesiens(&mut self, pts: &[PlotPoint]) {
        self.points = pts.iter().map(|p| p.y.map(|y| [p.x, y])).collect();
        self.erreur.clear();
    }

    pub fn set_points_polaires(&mut self, pts: Vec<Option<[f64; 2]>>) {
        self.points = pts;
        self.erreur.clear();
    }

    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.points.clear();
    }

    pub fn set_echantillons(&mut self, n: usize) {
        self.echantillons = n.clamp(2, TRACE_ECHANTILLONS_MAX);
    }
}

#[derive(Clone, Debug)]
pub struct EtatMatrices {
    pub a: String,
    pub b: String,
    pub op: OpMatrice,
    pub precision: Precision,
    pub resultat: String,
    pub erreur: String,
}

impl Default for EtatMatrices {
    fn default() -> Self {
        Self {
            a: "1, 2\n3, 4".to_string(),
            b: "5, 6\n7, 8".to_string(),
            op: OpMatrice::Produit,
            precision: Precision::Decimales(MATRICE_DECIMALES),
            resultat: String::new(),
            erreur: String::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- noyau ---
    pub session: Session,

    // --- sorties ---
    pub affichage: String, // dernier résultat formaté
    pub erreur: String,    // message d’erreur (si analyse/éval échoue)
    pub historique: Vec<LigneHistorique>,

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- autres onglets ---
    pub onglet: Onglet,
    pub graphe: EtatGraphe,
    pub matrices: EtatMatrices,

    // --- UX ---
    pub sombre: bool,
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            entree: String::new(),
            session: Session::new(),
            affichage: String::new(),
            erreur: String::new(),
            historique: Vec::new(),
            demarche: Demarche::default(),
            onglet: Onglet::default(),
            graphe: EtatGraphe::default(),
            matrices: EtatMatrices::default(),
            sombre: true,
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + session), précision conservée.
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.session.clear();
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.affichage.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    pub fn clear_historique(&mut self) {
        self.historique.clear();
    }

    /// Utilitaire : placer une erreur.
    ///
    /// Choix UX : on CONSERVE `affichage` (dernier résultat) pour ne pas
    /// “effacer l’écran” sur une faute ; la démarche, elle, n’est plus fiable.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// Utilitaire : déposer un résultat (affichage + démarche + historique).
    pub fn set_resultat(&mut self, entree: &str, affichage: String, demarche: Demarche) {
        self.erreur.clear();
        self.historique.push(LigneHistorique {
            entree: entree.trim().to_string(),
            affichage: affichage.clone(),
        });
        if self.historique.len() > HISTORIQUE_MAX {
            self.historique.remove(0);
        }
        self.affichage = affichage;
        self.demarche = demarche;
        self.focus_entree = true;
    }

    /// None = affichage complet ; Some(n) = n décimales, borné.
    pub fn set_precision(&mut self, decimales: Option<usize>) {
        self.session.precision = match decimales {
            None => Precision::Complete,
            Some(n) => Precision::Decimales(n.min(DECIMALES_MAX)),
        };
        self.focus_entree = true;
    }

    /// Ajoute du texte en fin d’entrée.
    pub fn inserer(&mut self, texte: &str) {
        self.entree.push_str(texte);
        self.focus_entree = true;
    }

    /// Insère une valeur (Ans / MR) au format complet, parenthésée si négative.
    pub fn inserer_valeur(&mut self, v: f64) {
        match texte_valeur(v) {
            Some(t) => self.inserer(&t),
            None => self.set_erreur("valeur non affichable"),
        }
    }
}

/// Texte relisible d’une valeur : "(-2.5)" pour les négatifs.
pub fn texte_valeur(v: f64) -> Option<String> {
    let t = format_value(v, Precision::Complete).ok()?;
    if t.starts_with('-') {
        Some(format!("({t})"))
    } else {
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_bornee() {
        let mut app = AppCalc::default();
        app.set_precision(Some(10_000));
        assert_eq!(app.session.precision, Precision::Decimales(DECIMALES_MAX));
        app.set_precision(None);
        assert_eq!(app.session.precision, Precision::Complete);
    }

    #[test]
    fn valeurs_negatives_parenthesees() {
        assert_eq!(texte_valeur(42.0).as_deref(), Some("42"));
        assert_eq!(texte_valeur(-2.5).as_deref(), Some("(-2.5)"));
        assert_eq!(texte_valeur(f64::NAN), None);
    }

    #[test]
    fn historique_borne() {
        let mut app = AppCalc::default();
        for k in 0..(HISTORIQUE_MAX + 5) {
            app.set_resultat(&k.to_string(), k.to_string(), Demarche::default());
        }
        assert_eq!(app.historique.len(), HISTORIQUE_MAX);
        assert_eq!(app.historique[0].entree, "5");
    }

    #[test]
    fn erreur_conserve_le_dernier_resultat() {
        let mut app = AppCalc::default();
        app.set_resultat("1+1", "2".into(), Demarche::default());
        app.set_erreur("division par zéro");
        assert_eq!(app.affichage, "2");
        assert_eq!(app.erreur, "division par zéro");
    }

    #[test]
    fn echantillons_bornes() {
        let mut g = EtatGraphe::default();
        g.set_echantillons(0);
        assert_eq!(g.echantillons, 2);
        g.set_echantillons(usize::MAX);
        assert_eq!(g.echantillons, TRACE_ECHANTILLONS_MAX);
    }
}
