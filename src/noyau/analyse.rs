// src/noyau/analyse.rs
//
// Descente récursive (montée de précédence) -> Expr
//
// Précédence, du plus faible au plus fort :
//   affectation `ident = expr` (forme la plus externe seulement)
//   < additif `+ -` (gauche)
//   < multiplicatif `* /` (gauche)
//   < moins unaire (préfixe)
//   < puissance `^` (droite)
//   < factorielle `!` (postfixe)
//   < primaire : nombre, ident, appel `f(a, b)`, `( expr )`, `| expr |`
//
// Règles:
// - Ident suivi de '(' => appel ; sinon variable (constantes comprises).
// - `|e|` est une règle de grammaire dédiée => Call("abs", [e]).
// - Aucune réparation : entrée ambiguë => SyntaxError (attendu vs trouvé).

use super::erreur::{EvalError, Resultat};
use super::expr::Expr;
use super::fonctions::{est_constante, fonction};
use super::jetons::{Jeton, Tok};

/// Garde-fous : l’évaluation est récursive sur l’arbre.
/// MAX_PROFONDEUR borne à la fois la récursion de l’analyseur ET la hauteur
/// de l’arbre produit (chaînes `1+1+…`, `1!!!…` comprises).
const MAX_JETONS: usize = 4096;
pub(crate) const MAX_PROFONDEUR: usize = 256;

/// Analyse une ligne complète (affectation éventuelle + expression).
pub fn parse(jetons: &[Jeton]) -> Resultat<Expr> {
    let mut a = Analyseur::new(jetons);

    if jetons.len() > MAX_JETONS {
        return Err(EvalError::syntax(
            format!("au plus {MAX_JETONS} jetons"),
            format!("{} jetons", jetons.len()),
            0,
        ));
    }

    let e = a.ligne()?;

    // jetons en trop (ex: "2 3", "(1))")
    if let Some(j) = a.courant() {
        return Err(EvalError::syntax("fin de l’entrée", j.texte.clone(), j.pos));
    }

    Ok(e)
}

/// Sous-arbre construit + sa hauteur.
struct Noeud {
    expr: Expr,
    hauteur: usize,
}

struct Analyseur<'a> {
    jetons: &'a [Jeton],
    pos: usize,
    profondeur: usize,
}

impl<'a> Analyseur<'a> {
    fn new(jetons: &'a [Jeton]) -> Self {
        Self {
            jetons,
            pos: 0,
            profondeur: 0,
        }
    }

    fn courant(&self) -> Option<&'a Jeton> {
        self.jetons.get(self.pos)
    }

    fn tok_a(&self, decalage: usize) -> Option<&'a Tok> {
        self.jetons.get(self.pos + decalage).map(|j| &j.tok)
    }

    fn avance(&mut self) {
        self.pos += 1;
    }

    /// Position “fin de l’entrée” : juste après le dernier jeton.
    fn fin(&self) -> usize {
        self.jetons
            .last()
            .map(|j| j.pos + j.texte.chars().count())
            .unwrap_or(0)
    }

    fn erreur_ici(&self, attendu: impl Into<String>) -> EvalError {
        match self.courant() {
            Some(j) => EvalError::syntax(attendu, j.texte.clone(), j.pos),
            None => EvalError::syntax(attendu, "fin de l’entrée", self.fin()),
        }
    }

    fn attend(&mut self, tok: Tok, texte: &str) -> Resultat<()> {
        match self.courant() {
            Some(j) if j.tok == tok => {
                self.avance();
                Ok(())
            }
            _ => Err(self.erreur_ici(format!("'{texte}'"))),
        }
    }

    /// Hauteur bornée : évaluation, rendu et libération de l’arbre sont récursifs.
    fn noeud(&self, expr: Expr, hauteur: usize) -> Resultat<Noeud> {
        if hauteur > MAX_PROFONDEUR {
            return Err(self.erreur_ici(format!(
                "au plus {MAX_PROFONDEUR} niveaux d’imbrication"
            )));
        }
        Ok(Noeud { expr, hauteur })
    }

    /* ------------------------ Affectation (niveau ligne) ------------------------ */

    fn ligne(&mut self) -> Resultat<Expr> {
        if let (Some(Tok::Ident(nom)), Some(Tok::Egal)) = (self.tok_a(0), self.tok_a(1)) {
            if est_constante(nom) {
                let j = &self.jetons[self.pos];
                return Err(EvalError::syntax(
                    "un nom de variable",
                    format!("la constante {}", j.texte),
                    j.pos,
                ));
            }
            let nom = nom.clone();
            self.pos += 2;

            let valeur = self.expression()?;

            // x = y = 3 : une seule affectation par ligne
            if let Some(j) = self.courant() {
                if j.tok == Tok::Egal {
                    return Err(EvalError::syntax("une seule affectation", "'='", j.pos));
                }
            }
            let n = self.noeud(Expr::Assign(nom, Box::new(valeur.expr)), valeur.hauteur + 1)?;
            return Ok(n.expr);
        }

        let e = self.expression()?;

        // (x) = 3, 2*x = 3 : la cible doit être un identifiant nu
        if let Some(j) = self.courant() {
            if j.tok == Tok::Egal {
                return Err(EvalError::syntax(
                    "un identifiant seul avant '='",
                    "'='",
                    j.pos,
                ));
            }
        }

        Ok(e.expr)
    }

    /* ------------------------ Binaires gauches ------------------------ */

    fn expression(&mut self) -> Resultat<Noeud> {
        let mut gauche = self.terme()?;

        loop {
            let construit: fn(Box<Expr>, Box<Expr>) -> Expr = match self.tok_a(0) {
                Some(Tok::Plus) => Expr::Add,
                Some(Tok::Minus) => Expr::Sub,
                _ => break,
            };
            self.avance();
            let droite = self.terme()?;
            gauche = self.binaire(construit, gauche, droite)?;
        }

        Ok(gauche)
    }

    fn terme(&mut self) -> Resultat<Noeud> {
        let mut gauche = self.unaire()?;

        loop {
            let construit: fn(Box<Expr>, Box<Expr>) -> Expr = match self.tok_a(0) {
                Some(Tok::Star) => Expr::Mul,
                Some(Tok::Slash) => Expr::Div,
                _ => break,
            };
            self.avance();
            let droite = self.unaire()?;
            gauche = self.binaire(construit, gauche, droite)?;
        }

        Ok(gauche)
    }

    fn binaire(
        &self,
        construit: fn(Box<Expr>, Box<Expr>) -> Expr,
        gauche: Noeud,
        droite: Noeud,
    ) -> Resultat<Noeud> {
        let hauteur = gauche.hauteur.max(droite.hauteur) + 1;
        self.noeud(
            construit(Box::new(gauche.expr), Box::new(droite.expr)),
            hauteur,
        )
    }

    /* ------------------------ Unaire / puissance / postfixe ------------------------ */

    fn unaire(&mut self) -> Resultat<Noeud> {
        // profondeur de RÉCURSION de l’analyseur (parenthèses, moins répétés)
        self.profondeur += 1;
        if self.profondeur > MAX_PROFONDEUR {
            return Err(self.erreur_ici(format!(
                "au plus {MAX_PROFONDEUR} niveaux d’imbrication"
            )));
        }

        let r = if self.tok_a(0) == Some(&Tok::Minus) {
            self.avance();
            self.unaire()
                .and_then(|x| self.noeud(Expr::Neg(Box::new(x.expr)), x.hauteur + 1))
        } else {
            self.puissance()
        };

        self.profondeur -= 1;
        r
    }

    /// `^` associatif à droite ; l’exposant peut porter un moins unaire (2^-1).
    fn puissance(&mut self) -> Resultat<Noeud> {
        let base = self.postfixe()?;

        if self.tok_a(0) == Some(&Tok::Caret) {
            self.avance();
            let exposant = self.unaire()?;
            return self.binaire(Expr::Pow, base, exposant);
        }

        Ok(base)
    }

    fn postfixe(&mut self) -> Resultat<Noeud> {
        let mut e = self.primaire()?;
        while self.tok_a(0) == Some(&Tok::Bang) {
            self.avance();
            e = self.noeud(Expr::Fact(Box::new(e.expr)), e.hauteur + 1)?;
        }
        Ok(e)
    }

    /* ------------------------ Primaire ------------------------ */

    fn primaire(&mut self) -> Resultat<Noeud> {
        let Some(j) = self.courant() else {
            return Err(self.erreur_ici("une opérande"));
        };

        match &j.tok {
            Tok::Num(v) => {
                self.avance();
                self.noeud(Expr::Num(*v), 1)
            }

            Tok::Ident(nom) => {
                self.avance();
                if self.tok_a(0) == Some(&Tok::LPar) {
                    self.appel(nom.clone())
                } else {
                    self.noeud(Expr::Var(nom.clone()), 1)
                }
            }

            Tok::LPar => {
                self.avance();
                let e = self.expression()?;
                self.attend(Tok::RPar, ")")?;
                Ok(e)
            }

            Tok::Barre => {
                self.avance();
                let e = self.expression()?;
                self.attend(Tok::Barre, "|")?;
                self.noeud(Expr::Call("abs".to_string(), vec![e.expr]), e.hauteur + 1)
            }

            _ => Err(self.erreur_ici("une opérande")),
        }
    }

    /// `nom(` déjà reconnu ; on est sur la parenthèse ouvrante.
    fn appel(&mut self, nom: String) -> Resultat<Noeud> {
        self.attend(Tok::LPar, "(")?;
        let mut args = Vec::new();
        let mut hauteur = 0;

        if self.tok_a(0) == Some(&Tok::RPar) {
            // sin() : une fonction connue qui exige des arguments => refus à l’analyse
            if let Some(f) = fonction(&nom) {
                if f.arite >= 1 {
                    return Err(self.erreur_ici(format!("{} argument(s) pour {nom}", f.arite)));
                }
            }
            self.avance();
            return self.noeud(Expr::Call(nom, args), 1);
        }

        loop {
            let arg = self.expression()?;
            hauteur = hauteur.max(arg.hauteur);
            args.push(arg.expr);
            match self.tok_a(0) {
                Some(Tok::Virgule) => self.avance(),
                Some(Tok::RPar) => {
                    self.avance();
                    break;
                }
                _ => return Err(self.erreur_ici("',' ou ')'")),
            }
        }

        self.noeud(Expr::Call(nom, args), hauteur + 1)
    }
}
