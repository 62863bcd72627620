// src/noyau/jetons.rs

use super::erreur::{EvalError, Resultat};

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),

    // Fonctions + variables + constantes (pi, e)
    // NOTE: l’analyse décidera si c’est un appel (suivi de '(') ou une variable.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^
    Bang,  // ! (factorielle postfixe)
    Egal,  // = (affectation seulement, jamais comparaison)

    LPar,
    RPar,
    Virgule,
    Barre, // | ... | (valeur absolue, appariée par l’analyse)
}

/// Jeton + position (index en caractères dans l’entrée) + texte source.
#[derive(Clone, Debug, PartialEq)]
pub struct Jeton {
    pub tok: Tok,
    pub pos: usize,
    pub texte: String,
}

impl Jeton {
    fn new(tok: Tok, pos: usize, texte: impl Into<String>) -> Self {
        Self {
            tok,
            pos,
            texte: texte.into(),
        }
    }
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - nombres 12, 3.25, 6.02e23, 1E-3
/// - identifiants [A-Za-z_][A-Za-z0-9_]* (sensibles à la casse)
/// - π (équivaut à ident("pi"))
/// - opérateurs + - * / ^ ! =
/// - parenthèses ( ), virgule, barres | |
///
/// Les barres doivent être en nombre pair : sinon on refuse (pas de devinette).
pub fn tokenize(s: &str) -> Resultat<Vec<Jeton>> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let simple = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            ',' => Some(Tok::Virgule),
            '|' => Some(Tok::Barre),
            '+' => Some(Tok::Plus),
            '-' => Some(Tok::Minus),
            '*' => Some(Tok::Star),
            '/' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            '!' => Some(Tok::Bang),
            '=' => Some(Tok::Egal),
            _ => None,
        };
        if let Some(tok) = simple {
            out.push(Jeton::new(tok, i, c.to_string()));
            i += 1;
            continue;
        }

        if c == 'π' {
            out.push(Jeton::new(Tok::Ident("pi".to_string()), i, "π"));
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            out.push(Jeton::new(Tok::Ident(word.clone()), start, word));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            i = fin_nombre(&chars, i);
            let texte: String = chars[start..i].iter().collect();
            let v: f64 = texte.parse().map_err(|_| EvalError::Lex {
                caractere: c,
                position: start,
            })?;
            // 1e999 : littéral hors de portée de f64
            if !v.is_finite() {
                return Err(EvalError::Overflow);
            }
            out.push(Jeton::new(Tok::Num(v), start, texte));
            continue;
        }

        return Err(EvalError::Lex {
            caractere: c,
            position: i,
        });
    }

    verifie_barres(&out)?;
    Ok(out)
}

/// Avance sur `[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?` et renvoie l’index de fin.
/// Un '.' ou un 'e' qui ne prolonge pas le nombre est laissé au jeton suivant.
fn fin_nombre(chars: &[char], mut i: usize) -> usize {
    let chiffre = |k: usize| k < chars.len() && chars[k].is_ascii_digit();

    while chiffre(i) {
        i += 1;
    }

    if i < chars.len() && chars[i] == '.' && chiffre(i + 1) {
        i += 1;
        while chiffre(i) {
            i += 1;
        }
    }

    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut k = i + 1;
        if k < chars.len() && (chars[k] == '+' || chars[k] == '-') {
            k += 1;
        }
        if chiffre(k) {
            i = k;
            while chiffre(i) {
                i += 1;
            }
        }
    }

    i
}

/// Barres impaires => LexError sur la dernière barre (celle qui reste seule).
fn verifie_barres(jetons: &[Jeton]) -> Resultat<()> {
    let barres: Vec<&Jeton> = jetons.iter().filter(|j| j.tok == Tok::Barre).collect();
    if barres.len() % 2 == 1 {
        if let Some(derniere) = barres.last() {
            return Err(EvalError::Lex {
                caractere: '|',
                position: derniere.pos,
            });
        }
    }
    Ok(())
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(jetons: &[Jeton]) -> String {
    jetons
        .iter()
        .map(|j| j.texte.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
