// src/noyau/expr.rs
//
// Arbre d’expression (strict : chaque noeud possède ses enfants, aucun partage).
// - Num    : littéral
// - Var    : variable ou constante (pi, e) résolue À L’ÉVALUATION
// - Neg    : moins unaire
// - Fact   : factorielle postfixe
// - Add/Sub/Mul/Div/Pow : opérateurs binaires
// - Call   : appel de fonction nommée
// - Assign : affectation (forme la plus externe seulement)
//
// IMPORTANT :
// - l’arbre n’est jamais modifié après construction ; réévaluer = changer
//   l’environnement, pas l’arbre.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),

    Neg(Box<Expr>),
    Fact(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),

    Call(String, Vec<Expr>),
    Assign(String, Box<Expr>),
}

impl Expr {
    /// Vrai si l’expression lit `nom` quelque part (utile au traceur).
    pub fn utilise(&self, nom: &str) -> bool {
        use Expr::*;

        match self {
            Num(_) => false,
            Var(v) => v == nom,
            Neg(x) | Fact(x) | Assign(_, x) => x.utilise(nom),
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Pow(a, b) => {
                a.utilise(nom) || b.utilise(nom)
            }
            Call(_, args) => args.iter().any(|a| a.utilise(nom)),
        }
    }
}

/// Rendu texte complètement parenthésé (ré-analysable tel quel).
/// Sert à la “démarche” : on voit comment la précédence a été appliquée.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;

        match self {
            Num(v) => write!(f, "{v}"),
            Var(nom) => write!(f, "{nom}"),

            Neg(x) => write!(f, "(-{x})"),
            Fact(x) => write!(f, "({x}!)"),

            Add(a, b) => write!(f, "({a} + {b})"),
            Sub(a, b) => write!(f, "({a} - {b})"),
            Mul(a, b) => write!(f, "({a} * {b})"),
            Div(a, b) => write!(f, "({a} / {b})"),
            Pow(a, b) => write!(f, "({a} ^ {b})"),

            Call(nom, args) => {
                write!(f, "{nom}(")?;
                for (k, a) in args.iter().enumerate() {
                    if k > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }

            Assign(nom, x) => write!(f, "{nom} = {x}"),
        }
    }
}
