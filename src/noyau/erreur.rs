// src/noyau/erreur.rs
//
// Taxonomie des erreurs du noyau.
// Chaque étape du pipeline (jetons -> analyse -> éval -> format) renvoie
// une erreur typée ; la première rencontrée court-circuite la suite.
// Les messages (Display) sont destinés à l’affichage UI.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    /// Caractère non reconnu (ou barre | orpheline) à la position donnée.
    #[error("caractère inattendu '{caractere}' (position {position})")]
    Lex { caractere: char, position: usize },

    /// Attendu vs trouvé, position en caractères dans l’entrée.
    #[error("syntaxe : attendu {attendu}, trouvé {trouve} (position {position})")]
    Syntax {
        attendu: String,
        trouve: String,
        position: usize,
    },

    #[error("variable inconnue : {nom}")]
    UnboundVariable { nom: String },

    #[error("fonction inconnue : {nom}")]
    UnknownFunction { nom: String },

    #[error("{nom} attend {attendu} argument(s), reçu {recu}")]
    Arity {
        nom: String,
        attendu: usize,
        recu: usize,
    },

    #[error("division par zéro")]
    DivisionByZero,

    /// `operation` : nom de la fonction ou de l’opérateur fautif.
    #[error("hors domaine : {operation}({valeur})")]
    Domain { operation: String, valeur: f64 },

    #[error("dépassement numérique")]
    Overflow,

    #[error("valeur non finie : impossible à afficher")]
    Format,
}

impl EvalError {
    pub(crate) fn syntax(attendu: impl Into<String>, trouve: impl Into<String>, position: usize) -> Self {
        EvalError::Syntax {
            attendu: attendu.into(),
            trouve: trouve.into(),
            position,
        }
    }

    pub(crate) fn domain(operation: impl Into<String>, valeur: f64) -> Self {
        EvalError::Domain {
            operation: operation.into(),
            valeur,
        }
    }

    /// Erreurs “structurelles” : elles ne dépendent pas de la valeur des variables.
    /// (Le traceur abandonne sur celles-ci, et troue la courbe sur les autres.)
    pub fn est_structurelle(&self) -> bool {
        matches!(
            self,
            EvalError::Lex { .. }
                | EvalError::Syntax { .. }
                | EvalError::UnboundVariable { .. }
                | EvalError::UnknownFunction { .. }
                | EvalError::Arity { .. }
        )
    }
}

pub type Resultat<T> = Result<T, EvalError>;
