//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - seules les erreurs NUMÉRIQUES sont attendues sur des expressions bien formées
//! - invariants clés :
//!   * succès => l’affichage complet relu redonne la même valeur
//!   * échec  => dernière réponse de la session inchangée
//!   * entrée aléatoire => jamais de panique, toujours une erreur typée

use std::time::{Duration, Instant};

use super::erreur::EvalError;
use super::eval::evaluate_line;
use super::session::Session;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_numerique(e: &EvalError) -> bool {
    // Liste blanche : erreurs *normales* sur une expression bien formée.
    matches!(
        e,
        EvalError::DivisionByZero | EvalError::Domain { .. } | EvalError::Overflow
    )
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    // petits entiers (0 inclus : utile pour les divisions par zéro) + décimaux
    let a = rng.pick(10);
    if rng.coin() {
        format!("{a}")
    } else {
        format!("{a}.{}", rng.pick(100))
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 | 2 => gen_nombre(rng),
        3 => "pi".to_string(),
        4 => "e".to_string(),
        _ => "x".to_string(), // toujours liée par la session de fuzz
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    let a = gen_expr(rng, depth - 1);
    match rng.pick(12) {
        0 => gen_atom(rng),
        1 => format!("({a}+{})", gen_expr(rng, depth - 1)),
        2 => format!("({a}-{})", gen_expr(rng, depth - 1)),
        3 => format!("({a}*{})", gen_expr(rng, depth - 1)),
        4 => format!("({a}/{})", gen_expr(rng, depth - 1)),
        5 => format!("({a})^{}", rng.pick(4)),
        6 => format!("-({a})"),
        7 => format!("sqrt({a})"),
        8 => format!("log({a})"),
        9 => format!("|{a}|"),
        10 => format!("({})!", rng.pick(8)),
        _ => {
            let f = ["sin", "cos", "tan", "exp", "atan"][rng.pick(5) as usize];
            format!("{f}({a})")
        }
    }
}

fn gen_bruit(rng: &mut Rng) -> String {
    const ALPHABET: &[char] = &[
        '0', '1', '9', '.', 'e', 'x', 'p', 'i', 's', 'n', '+', '-', '*', '/', '^', '!', '=', '(',
        ')', ',', '|', ' ', '#', 'π',
    ];
    let n = 1 + rng.pick(16) as usize;
    (0..n)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize])
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_expressions_bien_formees() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut session = Session::new();
    evaluate_line("x = 0.75", &mut session).unwrap();

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..200 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let avant = session.recall_last_answer();

        match evaluate_line(&expr, &mut session) {
            Ok(r) => {
                assert!(r.valeur.is_finite(), "expr={expr:?}");
                // relecture du format complet : même valeur
                let relu = evaluate_line(&r.affichage, &mut session)
                    .unwrap_or_else(|e| panic!("relecture {:?} err={e}", r.affichage));
                assert_eq!(relu.valeur, r.valeur, "expr={expr:?}");
                seen_ok += 1;
            }
            Err(e) => {
                assert!(
                    is_erreur_numerique(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                assert_eq!(session.recall_last_answer(), avant, "expr={expr:?}");
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 20, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_determinisme() {
    let mut rng1 = Rng::new(0xBADC0DE_u64);
    let mut rng2 = Rng::new(0xBADC0DE_u64);
    let mut s1 = Session::new();
    let mut s2 = Session::new();
    s1.set_variable("x", 2.0);
    s2.set_variable("x", 2.0);

    for _ in 0..60 {
        let e1 = gen_expr(&mut rng1, 3);
        let e2 = gen_expr(&mut rng2, 3);
        assert_eq!(e1, e2);

        let r1 = evaluate_line(&e1, &mut s1).map(|r| r.affichage);
        let r2 = evaluate_line(&e2, &mut s2).map(|r| r.affichage);
        assert_eq!(r1, r2, "expr={e1:?}");
    }
}

#[test]
fn fuzz_safe_bruit_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let mut rng = Rng::new(0x5EED_u64);
    let mut session = Session::new();

    for _ in 0..500 {
        budget(t0, max);

        let entree = gen_bruit(&mut rng);
        let avant_x = session.get_variable("x");
        let avant = session.recall_last_answer();

        match evaluate_line(&entree, &mut session) {
            Ok(r) => assert!(r.valeur.is_finite(), "entree={entree:?}"),
            Err(_) => {
                assert_eq!(session.recall_last_answer(), avant, "entree={entree:?}");
                assert_eq!(session.get_variable("x"), avant_x, "entree={entree:?}");
            }
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let expr = somme_balancee("1/2", 500);
    budget(t0, max);

    let mut session = Session::new();
    let r = evaluate_line(&expr, &mut session).unwrap_or_else(|e| panic!("err: {e}"));

    // 500*(1/2) = 250
    assert_eq!(r.affichage, "250");
}
