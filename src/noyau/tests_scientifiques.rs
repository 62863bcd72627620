//! Tests scientifiques (campagne) : propriétés du noyau de bout en bout.
//!
//! But : vérifier les contrats visibles depuis l’UI, pas les détails internes.
//! - valeurs exactes (à la tolérance flottante près)
//! - erreurs typées (jamais Infinity / NaN déguisés)
//! - session intacte après échec
//! - réévaluation isolée (traceur)
//! - format “complet” relisible

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;

use super::erreur::EvalError;
use super::eval::{evaluate_at, evaluate_line, parse_only};
use super::format::{format_value, Precision};
use super::session::Session;

fn eval_ok(s: &mut Session, expr: &str) -> f64 {
    evaluate_line(expr, s)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .valeur
}

fn eval_err(s: &mut Session, expr: &str) -> EvalError {
    match evaluate_line(expr, s) {
        Ok(r) => panic!("expr={expr:?} devait échouer, obtenu {}", r.affichage),
        Err(e) => e,
    }
}

fn assert_domaine(expr: &str) {
    let mut s = Session::new();
    let e = eval_err(&mut s, expr);
    assert!(
        matches!(e, EvalError::Domain { .. }),
        "expr={expr:?} : DomainError attendue, obtenu {e:?}"
    );
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Littéraux ------------------------ */

#[test]
fn sci_arithmetique_litterale() {
    let mut s = Session::new();
    assert_relative_eq!(eval_ok(&mut s, "2+3*4"), 14.0);
    assert_relative_eq!(eval_ok(&mut s, "2^10"), 1024.0);
    assert_relative_eq!(eval_ok(&mut s, "(2+3)*4"), 20.0);
    assert_relative_eq!(eval_ok(&mut s, "0.1+0.2"), 0.3, epsilon = 1e-15);
    assert_relative_eq!(eval_ok(&mut s, "1.5e3 / 3"), 500.0);
}

/* ------------------------ Affectation ------------------------ */

#[test]
fn sci_affectation_aller_retour() {
    let mut s = Session::new();
    assert_eq!(eval_ok(&mut s, "x=5"), 5.0);
    assert_eq!(eval_ok(&mut s, "x+1"), 6.0);
}

#[test]
fn sci_affectation_ratee_laisse_non_lie() {
    let mut s = Session::new();
    assert_eq!(eval_err(&mut s, "x=1/0"), EvalError::DivisionByZero);
    assert_eq!(
        eval_err(&mut s, "x+1"),
        EvalError::UnboundVariable { nom: "x".into() }
    );
}

#[test]
fn sci_echec_ne_touche_pas_la_derniere_reponse() {
    let mut s = Session::new();
    eval_ok(&mut s, "7*6");
    for mauvais in ["5/0", "sqrt(-1)", "y+1", "2+", "#"] {
        let _ = eval_err(&mut s, mauvais);
        assert_eq!(s.recall_last_answer(), 42.0, "après {mauvais:?}");
    }
}

/* ------------------------ Erreurs ------------------------ */

#[test]
fn sci_division_par_zero() {
    let mut s = Session::new();
    assert_eq!(eval_err(&mut s, "5/0"), EvalError::DivisionByZero);
    assert_eq!(eval_err(&mut s, "1/(2-2)"), EvalError::DivisionByZero);
}

#[test]
fn sci_domaines() {
    assert_domaine("sqrt(-1)");
    assert_domaine("log(0)");
    assert_domaine("(-1)^0.5");
    assert_domaine("acos(2)");
}

#[test]
fn sci_factorielle() {
    let mut s = Session::new();
    assert_eq!(eval_ok(&mut s, "5!"), 120.0);
    assert_eq!(eval_ok(&mut s, "0!"), 1.0);
    assert_eq!(eval_ok(&mut s, "3!!"), 720.0);
    assert_domaine("(-1)!");
    assert_domaine("3.5!");
    assert_domaine("23!");
}

#[test]
fn sci_variable_non_liee() {
    let mut s = Session::new();
    assert_eq!(
        eval_err(&mut s, "y+1"),
        EvalError::UnboundVariable { nom: "y".into() }
    );
}

/* ------------------------ Réévaluation isolée ------------------------ */

#[test]
fn sci_reevaluation_isolee() {
    let arbre = parse_only("sin(x)").unwrap();

    let a = |x: f64| {
        let mut l = HashMap::new();
        l.insert("x".to_string(), x);
        evaluate_at(&arbre, &l).unwrap()
    };

    // ordre 1
    assert_relative_eq!(a(0.0), 0.0);
    assert_relative_eq!(a(FRAC_PI_2), 1.0);
    // ordre 2
    assert_relative_eq!(a(FRAC_PI_2), 1.0);
    assert_relative_eq!(a(0.0), 0.0);
}

#[test]
fn sci_reevaluation_independante_de_la_session() {
    let mut s = Session::new();
    eval_ok(&mut s, "x = 100");
    let arbre = parse_only("x + 1").unwrap();
    let mut l = HashMap::new();
    l.insert("x".to_string(), 1.0);
    assert_eq!(evaluate_at(&arbre, &l), Ok(2.0));
    assert_eq!(s.get_variable("x"), Some(100.0));
}

/* ------------------------ Format ------------------------ */

#[test]
fn sci_precision() {
    assert_eq!(
        format_value(1.0 / 3.0, Precision::Decimales(4)).unwrap(),
        "0.3333"
    );
    let complet = format_value(1.0 / 3.0, Precision::Complete).unwrap();
    assert_eq!(complet.parse::<f64>().unwrap(), 1.0 / 3.0);
    assert_eq!(
        format_value(f64::INFINITY, Precision::Complete),
        Err(EvalError::Format)
    );
}

#[test]
fn sci_idempotence_format_complet() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let mut s = Session::new();
    for expr in [
        "1/3",
        "-2/7",
        "sqrt(2)",
        "pi^20",
        "e^-30",
        "2^60 + 1",
        "-0.0",
        "1e-300 * 3",
        "22!",
    ] {
        let r = evaluate_line(expr, &mut s).unwrap_or_else(|e| panic!("{expr:?}: {e}"));
        let relu = evaluate_line(&r.affichage, &mut s)
            .unwrap_or_else(|e| panic!("relecture de {:?}: {e}", r.affichage));
        assert_eq!(relu.valeur, r.valeur, "expr={expr:?} affiché={:?}", r.affichage);
        budget(t0, max);
    }
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_somme_longue() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // 200 termes : arbre gauche de hauteur ~200, sous la borne d’imbrication.
    let expr = vec!["1/2"; 200].join(" + ");
    let mut s = Session::new();
    assert_eq!(eval_ok(&mut s, &expr), 100.0);
    budget(t0, max);
}

#[test]
fn sci_arbres_trop_hauts_refuses_sans_debordement() {
    let mut s = Session::new();
    eval_ok(&mut s, "7*6");

    // sous la limite de jetons, mais trop hauts pour une évaluation récursive
    for expr in [
        format!("1{}", "!".repeat(4000)),
        vec!["1"; 2048].join("+"),
        vec!["1/2"; 500].join(" + "),
    ] {
        let e = eval_err(&mut s, &expr);
        assert!(
            matches!(e, EvalError::Syntax { .. }),
            "SyntaxError attendue, obtenu {e:?}"
        );
        assert_eq!(s.recall_last_answer(), 42.0);
    }
}

#[test]
fn sci_stress_imbrication_moderee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let mut expr = "x".to_string();
    for _ in 0..60 {
        expr = format!("abs(-({expr}))");
    }
    let mut s = Session::new();
    eval_ok(&mut s, "x = 3");
    assert_eq!(eval_ok(&mut s, &expr), 3.0);
    budget(t0, max);
}
