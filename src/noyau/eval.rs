//! Noyau : évaluation (pipeline réel)
//!
//! texte -> jetons -> analyse -> Expr -> évaluation (Portee) -> f64 -> format
//!
//! Points d’entrée :
//! - `evaluate_line` : une ligne complète, met à jour la session ;
//! - `evaluate_at`   : réévalue un arbre déjà analysé avec des liaisons éphémères ;
//! - `parse_only`    : analyse seule (le traceur analyse UNE fois, évalue N fois) ;
//! - `evaluate_detached` : valeur d’une ligne sans toucher la session (M+ / M-).

use std::collections::HashMap;

use log::{debug, info};

use super::analyse::parse;
use super::erreur::{EvalError, Resultat};
use super::expr::Expr;
use super::fonctions::{constante, factorielle, fonction};
use super::format::format_value;
use super::jetons::{format_tokens, tokenize};
use super::session::{Portee, Session, Surcouche};

#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub arbre: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct LineResult {
    pub affichage: String,
    pub valeur: f64,
    pub demarche: DemarcheNoyau,
}

/// API publique : évalue une ligne contre la session.
///
/// Succès : dernière réponse mise à jour (et la variable, si affectation).
/// Échec : session intacte (ni affectation partielle, ni dernière réponse).
pub fn evaluate_line(texte: &str, session: &mut Session) -> Resultat<LineResult> {
    match evaluate_line_impl(texte, session) {
        Ok(r) => {
            info!("{} => {}", texte.trim(), r.affichage);
            Ok(r)
        }
        Err(e) => {
            debug!("échec {:?}: {e}", texte.trim());
            Err(e)
        }
    }
}

fn evaluate_line_impl(texte: &str, session: &mut Session) -> Resultat<LineResult> {
    // positions conservées par rapport au texte brut (pas de trim avant tokenize)
    let jetons = tokenize(texte)?;
    if jetons.is_empty() {
        return Err(EvalError::syntax("une expression", "entrée vide", 0));
    }
    let arbre = parse(&jetons)?;

    // Affectation : on calcule ET on formate avant de lier quoi que ce soit.
    let (cible, valeur) = match &arbre {
        Expr::Assign(nom, droite) => (Some(nom.as_str()), evaluate(droite, session)?),
        _ => (None, evaluate(&arbre, session)?),
    };
    let affichage = format_value(valeur, session.precision)?;

    let note = match cible {
        Some(nom) => {
            session.set_variable(nom, valeur);
            format!("affectation : {nom} ← {affichage}")
        }
        None => "Pipeline: jetons → analyse → arbre → évaluation → format.".to_string(),
    };
    session.record_last_answer(valeur);

    Ok(LineResult {
        affichage,
        valeur,
        demarche: DemarcheNoyau {
            jetons: format_tokens(&jetons),
            arbre: arbre.to_string(),
            note,
        },
    })
}

/// Réévalue un arbre avec des liaisons ponctuelles (ex: x du traceur).
/// Les liaisons ne sont jamais modifiées ; une affectation éventuelle
/// reste dans la surcouche jetée au retour.
pub fn evaluate_at(arbre: &Expr, liaisons: &HashMap<String, f64>) -> Resultat<f64> {
    let mut portee = Surcouche::new(liaisons);
    evaluate(arbre, &mut portee)
}

/// Analyse seule : texte -> Expr.
pub fn parse_only(texte: &str) -> Resultat<Expr> {
    let jetons = tokenize(texte)?;
    if jetons.is_empty() {
        return Err(EvalError::syntax("une expression", "entrée vide", 0));
    }
    parse(&jetons)
}

/// Valeur d’une ligne lue contre la session, sans la modifier.
pub fn evaluate_detached(texte: &str, session: &Session) -> Resultat<f64> {
    let arbre = parse_only(texte)?;
    let mut portee = Surcouche::new(session);
    evaluate(&arbre, &mut portee)
}

/* ------------------------ Évaluateur ------------------------ */

/// Parcourt l’arbre ; toute valeur intermédiaire non finie => Overflow.
pub fn evaluate<P: Portee + ?Sized>(expr: &Expr, portee: &mut P) -> Resultat<f64> {
    use Expr::*;

    match expr {
        Num(v) => fini(*v),

        // constantes d’abord : pi / e ne sont jamais des variables
        Var(nom) => constante(nom)
            .or_else(|| portee.variable(nom))
            .ok_or_else(|| EvalError::UnboundVariable { nom: nom.clone() }),

        Neg(x) => Ok(-evaluate(x, portee)?),
        Fact(x) => factorielle(evaluate(x, portee)?),

        Add(a, b) => fini(evaluate(a, portee)? + evaluate(b, portee)?),
        Sub(a, b) => fini(evaluate(a, portee)? - evaluate(b, portee)?),
        Mul(a, b) => fini(evaluate(a, portee)? * evaluate(b, portee)?),

        Div(a, b) => {
            let num = evaluate(a, portee)?;
            let den = evaluate(b, portee)?;
            if den == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            fini(num / den)
        }

        Pow(a, b) => {
            let base = evaluate(a, portee)?;
            let exposant = evaluate(b, portee)?;
            puissance(base, exposant)
        }

        Call(nom, args) => {
            let f = fonction(nom).ok_or_else(|| EvalError::UnknownFunction { nom: nom.clone() })?;
            if args.len() != f.arite {
                return Err(EvalError::Arity {
                    nom: nom.clone(),
                    attendu: f.arite,
                    recu: args.len(),
                });
            }
            let valeurs = args
                .iter()
                .map(|a| evaluate(a, portee))
                .collect::<Resultat<Vec<f64>>>()?;
            fini((f.eval)(&valeurs)?)
        }

        // droite d’abord ; liaison seulement si tout a réussi
        Assign(nom, x) => {
            let v = evaluate(x, portee)?;
            portee.affecter(nom, v);
            Ok(v)
        }
    }
}

fn fini(v: f64) -> Resultat<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EvalError::Overflow)
    }
}

/// base^exposant :
/// - base < 0 et exposant fractionnaire => DomainError (pas de complexe) ;
/// - 0^(négatif) => DivisionByZero (c’est 1/0^n).
fn puissance(base: f64, exposant: f64) -> Resultat<f64> {
    if base < 0.0 && exposant.fract() != 0.0 {
        return Err(EvalError::domain("^", base));
    }
    if base == 0.0 && exposant < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    fini(base.powf(exposant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::format::Precision;
    use approx::assert_relative_eq;

    fn ok(s: &str) -> f64 {
        let mut session = Session::new();
        evaluate_line(s, &mut session)
            .unwrap_or_else(|e| panic!("evaluate_line({s:?}) erreur: {e}"))
            .valeur
    }

    fn err(s: &str) -> EvalError {
        let mut session = Session::new();
        match evaluate_line(s, &mut session) {
            Ok(r) => panic!("evaluate_line({s:?}) devait échouer, obtenu {}", r.affichage),
            Err(e) => e,
        }
    }

    #[test]
    fn arithmetique() {
        assert_eq!(ok("2+3*4"), 14.0);
        assert_eq!(ok("2^10"), 1024.0);
        assert_eq!(ok("(2+3)*4"), 20.0);
        assert_eq!(ok("-2^2"), -4.0);
        assert_eq!(ok("2^3^2"), 512.0);
        assert_eq!(ok("2^-1"), 0.5);
        assert_eq!(ok("(-2)^3"), -8.0);
        assert_eq!(ok("10/4"), 2.5);
    }

    #[test]
    fn fonctions_et_constantes() {
        assert_relative_eq!(ok("sin(pi/2)"), 1.0);
        assert_relative_eq!(ok("cos(0)"), 1.0);
        assert_relative_eq!(ok("log(e)"), 1.0);
        assert_eq!(ok("max(2, 7)"), 7.0);
        assert_eq!(ok("|3-5|"), 2.0);
        assert_eq!(ok("abs(-4)"), 4.0);
        assert_eq!(ok("factorial(4)"), 24.0);
    }

    #[test]
    fn erreurs_typees() {
        assert_eq!(err("5/0"), EvalError::DivisionByZero);
        assert_eq!(err("0^-1"), EvalError::DivisionByZero);
        assert!(matches!(err("(-8)^(1/3)"), EvalError::Domain { .. }));
        assert_eq!(err("10^400"), EvalError::Overflow);
        assert_eq!(err("exp(1000)"), EvalError::Overflow);
        assert_eq!(
            err("foo(1)"),
            EvalError::UnknownFunction { nom: "foo".into() }
        );
        assert_eq!(
            err("sin(1, 2)"),
            EvalError::Arity {
                nom: "sin".into(),
                attendu: 1,
                recu: 2
            }
        );
        assert_eq!(
            err("sine"),
            EvalError::UnboundVariable { nom: "sine".into() }
        );
        assert_eq!(
            err("   "),
            EvalError::Syntax {
                attendu: "une expression".into(),
                trouve: "entrée vide".into(),
                position: 0
            }
        );
    }

    #[test]
    fn arite_verifiee_avant_les_arguments() {
        assert!(matches!(err("sin(1/0, 2)"), EvalError::Arity { .. }));
    }

    #[test]
    fn affectation_et_derniere_reponse() {
        let mut s = Session::new();
        let r = evaluate_line("x = 2*3", &mut s).unwrap();
        assert_eq!(r.valeur, 6.0);
        assert_eq!(r.affichage, "6");
        assert_eq!(s.get_variable("x"), Some(6.0));
        assert_eq!(s.recall_last_answer(), 6.0);
        assert!(r.demarche.note.contains("x"));

        evaluate_line("x + 1", &mut s).unwrap();
        assert_eq!(s.recall_last_answer(), 7.0);
    }

    #[test]
    fn echec_sans_effet() {
        let mut s = Session::new();
        evaluate_line("x = 1", &mut s).unwrap();
        assert!(evaluate_line("x = 1/0", &mut s).is_err());
        assert!(evaluate_line("y = sqrt(-1)", &mut s).is_err());
        assert_eq!(s.get_variable("x"), Some(1.0));
        assert_eq!(s.get_variable("y"), None);
        assert_eq!(s.recall_last_answer(), 1.0);
    }

    #[test]
    fn precision_de_session() {
        let mut s = Session::new();
        s.precision = Precision::Decimales(2);
        let r = evaluate_line("2/3", &mut s).unwrap();
        assert_eq!(r.affichage, "0.67");
        // la valeur numérique n’est pas arrondie
        assert_relative_eq!(r.valeur, 2.0 / 3.0);
    }

    #[test]
    fn demarche_renseignee() {
        let mut s = Session::new();
        let r = evaluate_line("1+2*3", &mut s).unwrap();
        assert_eq!(r.demarche.jetons, "1 + 2 * 3");
        assert_eq!(r.demarche.arbre, "(1 + (2 * 3))");
    }

    #[test]
    fn evaluate_at_isole() {
        let arbre = parse_only("x^2 + k").unwrap();
        let mut liaisons = HashMap::new();
        liaisons.insert("k".to_string(), 1.0);
        liaisons.insert("x".to_string(), 3.0);
        assert_eq!(evaluate_at(&arbre, &liaisons), Ok(10.0));

        liaisons.remove("k");
        assert_eq!(
            evaluate_at(&arbre, &liaisons),
            Err(EvalError::UnboundVariable { nom: "k".into() })
        );
    }

    #[test]
    fn evaluate_at_affectation_ephemere() {
        let arbre = parse_only("y = x + 1").unwrap();
        let mut liaisons = HashMap::new();
        liaisons.insert("x".to_string(), 1.0);
        assert_eq!(evaluate_at(&arbre, &liaisons), Ok(2.0));
        assert!(!liaisons.contains_key("y"));
    }

    #[test]
    fn detache_ne_modifie_pas_la_session() {
        let mut s = Session::new();
        evaluate_line("a = 4", &mut s).unwrap();
        assert_eq!(evaluate_detached("a = a * 10", &s), Ok(40.0));
        assert_eq!(s.get_variable("a"), Some(4.0));
        assert_eq!(s.recall_last_answer(), 4.0);
    }

    #[test]
    fn pas_de_collision_de_sous_chaines() {
        // "sine" contient "sin", "ln" dans "kiln" : aucun remplacement textuel
        let mut s = Session::new();
        evaluate_line("sine = 2", &mut s).unwrap();
        evaluate_line("kiln = 3", &mut s).unwrap();
        let r = evaluate_line("sine * kiln + sin(0)", &mut s).unwrap();
        assert_eq!(r.valeur, 6.0);
    }
}
