// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter évalue (quand le champ a le focus), Escape géré dans app.rs
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - Trois onglets : calculatrice, graphe, matrices
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)
// - Backspace clavier laissé au TextEdit ; DEL (bouton) retire un motif entier

use eframe::egui;
use log::debug;

use super::etat::{AppCalc, Demarche, EtatMatrices, Onglet, DECIMALES_DEFAUT, DECIMALES_MAX};
use crate::noyau::eval::{evaluate_detached, evaluate_line};
use crate::noyau::fonctions;
use crate::noyau::format::{format_value, Precision};
use crate::noyau::matrice::{calcule, format_resultat, parse_matrice, OpMatrice};
use crate::noyau::trace::{parse_body, sample, sample_polar};

/// Variable libre du tracé polaire : r = f(t).
const VAR_POLAIRE: &str = "t";

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        ui.horizontal(|ui| {
            ui.heading("Calculatrice sûre");
            ui.add_space(12.0);
            ui.selectable_value(&mut self.onglet, Onglet::Calculatrice, "Calcul");
            ui.selectable_value(&mut self.onglet, Onglet::Graphe, "Graphe");
            ui.selectable_value(&mut self.onglet, Onglet::Matrices, "Matrices");
            ui.separator();
            let theme = if self.sombre { "☀ Clair" } else { "🌙 Sombre" };
            if ui.button(theme).clicked() {
                self.sombre = !self.sombre;
            }
        });
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.onglet {
                Onglet::Calculatrice => self.ui_calculatrice(ui),
                Onglet::Graphe => self.ui_graphe(ui),
                Onglet::Matrices => self.ui_matrices(ui),
            });
    }

    /* ------------------------ Onglet calculatrice ------------------------ */

    fn ui_calculatrice(&mut self, ui: &mut egui::Ui) {
        self.ui_entree(ui);

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(8.0);

        ui.label("Résultat :");
        Self::champ_monospace(ui, "resultat_out", &self.affichage, 1);

        ui.add_space(8.0);
        self.ui_demarche(ui);
        self.ui_historique(ui);
        self.ui_variables(ui);
        self.ui_aide_fonctions(ui);
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Entrée :");

        // IMPORTANT : id stable + focus contrôlé
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 2+3*4, x = sqrt(2), |x - 3|, 5!")
                .id_source("entree_edit")
                .code_editor(),
        );

        // Si on a cliqué un bouton (pavé / fonctions / DEL / C / etc.), on redonne le focus
        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        // Enter évalue seulement si le champ est focus (ou vient de le perdre via Enter).
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (resp.has_focus() || resp.lost_focus()) && enter {
            self.eval_via_noyau();
        }

        ui.add_space(6.0);

        // Actions + précision
        ui.horizontal_wrapped(|ui| {
            // Contrat: C = entrée seulement ; CLR = résultat seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(
                ui,
                "CLR",
                "Efface résultat + erreur + démarche",
                Action::ClearResultats,
            );
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();
            self.ui_precision(ui);
        });

        ui.add_space(4.0);

        // Mémoire + dernière réponse
        ui.horizontal_wrapped(|ui| {
            self.bouton_action(ui, "M+", "Ajoute la valeur de l’entrée à la mémoire", Action::MemoirePlus);
            self.bouton_action(ui, "M−", "Retranche la valeur de l’entrée", Action::MemoireMoins);
            self.bouton_action(ui, "MR", "Insère la mémoire", Action::MemoireLire);
            self.bouton_action(ui, "MC", "Remet la mémoire à zéro", Action::MemoireEffacer);
            self.bouton_action(ui, "Ans", "Insère la dernière réponse", Action::DerniereReponse);

            ui.separator();
            match format_value(self.session.memory_read(), self.session.precision) {
                Ok(m) => ui.monospace(format!("M = {m}")),
                Err(e) => ui.colored_label(ui.visuals().error_fg_color, format!("M : {e}")),
            };
        });

        ui.add_space(8.0);

        // Pavé numérique + fonctions
        self.ui_pave_numerique(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_precision(&mut self, ui: &mut egui::Ui) {
        ui.label("Précision :");
        let mut complet = self.session.precision == Precision::Complete;
        if ui.checkbox(&mut complet, "complète").changed() {
            self.set_precision(if complet { None } else { Some(DECIMALES_DEFAUT) });
        }
        if let Precision::Decimales(n) = self.session.precision {
            let mut d = n as u32;
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(0..=DECIMALES_MAX as u32)
                    .suffix(" décimales"),
            );
            if resp.changed() {
                self.set_precision(Some(d as usize));
            }
        }
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique")
            .num_columns(5)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton_insert(ui, "7", "7", InsertKind::Digit);
                self.bouton_insert(ui, "8", "8", InsertKind::Digit);
                self.bouton_insert(ui, "9", "9", InsertKind::Digit);
                self.bouton_insert(ui, "/", "/", InsertKind::Op);
                self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);
                ui.end_row();

                self.bouton_insert(ui, "4", "4", InsertKind::Digit);
                self.bouton_insert(ui, "5", "5", InsertKind::Digit);
                self.bouton_insert(ui, "6", "6", InsertKind::Digit);
                self.bouton_insert(ui, "*", "*", InsertKind::Op);
                self.bouton_insert(ui, "(", "(", InsertKind::OpenParen);
                ui.end_row();

                self.bouton_insert(ui, "1", "1", InsertKind::Digit);
                self.bouton_insert(ui, "2", "2", InsertKind::Digit);
                self.bouton_insert(ui, "3", "3", InsertKind::Digit);
                self.bouton_insert(ui, "-", "-", InsertKind::Op);
                self.bouton_insert(ui, ")", ")", InsertKind::CloseParen);
                ui.end_row();

                self.bouton_insert(ui, "0", "0", InsertKind::Digit);
                self.bouton_insert(ui, ".", ".", InsertKind::Digit);
                self.bouton_insert(ui, "^", "^", InsertKind::Op);
                self.bouton_insert(ui, "+", "+", InsertKind::Op);
                let eq = ui.add_sized([46.0, 28.0], egui::Button::new("="));
                if eq.clicked() {
                    self.eval_via_noyau();
                }
                ui.end_row();
            });

        ui.add_space(6.0);

        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "sqrt", "sqrt(", InsertKind::Func);
            self.bouton_insert(ui, "sin", "sin(", InsertKind::Func);
            self.bouton_insert(ui, "cos", "cos(", InsertKind::Func);
            self.bouton_insert(ui, "tan", "tan(", InsertKind::Func);
            self.bouton_insert(ui, "log", "log(", InsertKind::Func);
            self.bouton_insert(ui, "exp", "exp(", InsertKind::Func);
            self.bouton_insert(ui, "|x|", "abs(", InsertKind::Func);
            self.bouton_insert(ui, "n!", "!", InsertKind::CloseParen);

            ui.separator();

            self.bouton_insert(ui, "pi", "pi", InsertKind::Word);
            self.bouton_insert(ui, "e", "e", InsertKind::Word);
            self.bouton_insert(ui, "x", "x", InsertKind::Word);
            self.bouton_insert(ui, "y", "y", InsertKind::Word);
            self.bouton_insert(ui, "=", "=", InsertKind::Op);
            self.bouton_insert(ui, ",", ",", InsertKind::CloseParen);
        });
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "Arbre", "demarche_arbre", &self.demarche.arbre);
                Self::champ_demarche(ui, "Note", "demarche_note", &self.demarche.note);
            });
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        let mut rappel = None;
        let mut vider = false;

        egui::CollapsingHeader::new(format!("Historique ({})", self.historique.len()))
            .default_open(true)
            .show(ui, |ui| {
                // plus récent en haut ; un clic remet l’entrée dans le champ
                for ligne in self.historique.iter().rev() {
                    let texte = format!("{} = {}", ligne.entree, ligne.affichage);
                    if ui
                        .add(egui::Button::new(egui::RichText::new(texte).monospace()).frame(false))
                        .clicked()
                    {
                        rappel = Some(ligne.entree.clone());
                    }
                }
                if !self.historique.is_empty() && ui.small_button("Vider l’historique").clicked() {
                    vider = true;
                }
            });

        if let Some(e) = rappel {
            self.entree = e;
            self.focus_entree = true;
        }
        if vider {
            self.clear_historique();
        }
    }

    fn ui_variables(&mut self, ui: &mut egui::Ui) {
        let precision = self.session.precision;
        let lignes: Vec<(String, String)> = self
            .session
            .variables()
            .map(|(nom, v)| (nom.to_string(), format_value(v, precision).unwrap_or_default()))
            .collect();

        let mut inserer = None;
        let mut effacer = false;

        egui::CollapsingHeader::new(format!("Variables ({})", lignes.len()))
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new("variables_session")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (nom, valeur) in &lignes {
                            if ui.small_button(nom.as_str()).clicked() {
                                inserer = Some(nom.clone());
                            }
                            ui.monospace(valeur);
                            ui.end_row();
                        }
                    });
                if !lignes.is_empty() && ui.small_button("Tout effacer").clicked() {
                    effacer = true;
                }
            });

        if let Some(nom) = inserer {
            self.inserer(&nom);
        }
        if effacer {
            // variables + mémoire + dernière réponse ; précision conservée
            self.session.clear();
            debug!("session effacée depuis le panneau variables");
        }
    }

    fn ui_aide_fonctions(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Fonctions")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for nom in fonctions::noms() {
                        let arite = fonctions::fonction(nom).map(|f| f.arite).unwrap_or(1);
                        let bouton = ui
                            .small_button(nom)
                            .on_hover_text(format!("{arite} argument(s)"));
                        if bouton.clicked() {
                            self.inserer(&format!("{nom}("));
                        }
                    }
                });
            });
    }

    /* ------------------------ Onglet graphe ------------------------ */

    fn ui_graphe(&mut self, ui: &mut egui::Ui) {
        let g = &mut self.graphe;

        ui.horizontal(|ui| {
            ui.checkbox(&mut g.polaire, "polaire");
            let hint = if g.polaire { "r = 1 + cos(t)" } else { "y = sin(x)" };
            ui.add(
                egui::TextEdit::singleline(&mut g.texte)
                    .hint_text(hint)
                    .id_source("graphe_edit")
                    .code_editor(),
            );
        });

        ui.horizontal_wrapped(|ui| {
            if !g.polaire {
                ui.label("x ∈");
                ui.add(egui::DragValue::new(&mut g.x_min).speed(0.1));
                ui.add(egui::DragValue::new(&mut g.x_max).speed(0.1));
                ui.separator();
            }
            let mut n = g.echantillons as u32;
            let resp = ui.add(egui::DragValue::new(&mut n).speed(10).suffix(" points"));
            if resp.changed() {
                g.set_echantillons(n as usize);
            }
        });

        if ui.button("Tracer").clicked() {
            self.tracer();
        }

        if !self.graphe.erreur.is_empty() {
            ui.colored_label(ui.visuals().error_fg_color, &self.graphe.erreur);
        }

        ui.add_space(6.0);
        self.ui_courbe(ui);
    }

    fn tracer(&mut self) {
        let g = &mut self.graphe;
        let arbre = match parse_body(&g.texte) {
            Ok(a) => a,
            Err(e) => return g.set_erreur(e.to_string()),
        };

        if g.polaire {
            match sample_polar(&arbre, VAR_POLAIRE, g.echantillons) {
                Ok(pts) => g.set_points_polaires(pts),
                Err(e) => g.set_erreur(e.to_string()),
            }
        } else {
            match sample(&arbre, "x", g.x_min, g.x_max, g.echantillons) {
                Ok(pts) => g.set_points_cartesiens(&pts),
                Err(e) => g.set_erreur(e.to_string()),
            }
        }
    }

    fn ui_courbe(&self, ui: &mut egui::Ui) {
        let taille = egui::vec2(ui.available_width(), 360.0);
        let (resp, painter) = ui.allocate_painter(taille, egui::Sense::hover());
        let cadre = resp.rect;
        painter.rect_filled(cadre, 4.0, ui.visuals().extreme_bg_color);

        let Some(b) = Bornes::de(&self.graphe.points, self.graphe.polaire) else {
            return;
        };

        let painter = painter.with_clip_rect(cadre);
        let vers_ecran = |p: [f64; 2]| {
            let [rx, ry] = b.relatif(p);
            egui::pos2(
                cadre.left() + rx * cadre.width(),
                cadre.bottom() - ry * cadre.height(),
            )
        };

        // axes
        let axe = egui::Stroke::new(1.0, ui.visuals().weak_text_color());
        if b.x0 <= 0.0 && 0.0 <= b.x1 {
            painter.line_segment([vers_ecran([0.0, b.y0]), vers_ecran([0.0, b.y1])], axe);
        }
        if b.y0 <= 0.0 && 0.0 <= b.y1 {
            painter.line_segment([vers_ecran([b.x0, 0.0]), vers_ecran([b.x1, 0.0])], axe);
        }

        // courbe coupée à chaque trou
        let trait_courbe = egui::Stroke::new(2.0, ui.visuals().selection.stroke.color);
        let mut morceau: Vec<egui::Pos2> = Vec::new();
        for p in &self.graphe.points {
            match p {
                Some(c) => morceau.push(vers_ecran(*c)),
                None => Self::trace_morceau(&painter, &mut morceau, trait_courbe),
            }
        }
        Self::trace_morceau(&painter, &mut morceau, trait_courbe);
    }

    fn trace_morceau(painter: &egui::Painter, morceau: &mut Vec<egui::Pos2>, stroke: egui::Stroke) {
        if morceau.len() >= 2 {
            painter.add(egui::Shape::line(std::mem::take(morceau), stroke));
        } else {
            morceau.clear();
        }
    }

    /* ------------------------ Onglet matrices ------------------------ */

    fn ui_matrices(&mut self, ui: &mut egui::Ui) {
        let m = &mut self.matrices;

        ui.label("Cases séparées par ',' ; lignes par un saut de ligne ou ';'.");
        ui.columns(2, |cols| {
            cols[0].label("A :");
            cols[0].add(
                egui::TextEdit::multiline(&mut m.a)
                    .desired_rows(4)
                    .id_source("matrice_a")
                    .code_editor(),
            );
            cols[1].label("B :");
            cols[1].add(
                egui::TextEdit::multiline(&mut m.b)
                    .desired_rows(4)
                    .id_source("matrice_b")
                    .code_editor(),
            );
        });

        ui.horizontal_wrapped(|ui| {
            egui::ComboBox::from_label("Opération")
                .selected_text(m.op.to_string())
                .show_ui(ui, |ui| {
                    for op in OpMatrice::TOUTES {
                        ui.selectable_value(&mut m.op, op, op.to_string());
                    }
                });

            ui.separator();
            let mut d = match m.precision {
                Precision::Decimales(n) => n as u32,
                Precision::Complete => DECIMALES_DEFAUT as u32,
            };
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(0..=DECIMALES_MAX as u32)
                    .suffix(" décimales"),
            );
            if resp.changed() {
                m.precision = Precision::Decimales(d as usize);
            }

            if ui.button("Calculer").clicked() {
                match calcul_matrices(m) {
                    Ok(texte) => {
                        m.resultat = texte;
                        m.erreur.clear();
                    }
                    Err(e) => {
                        m.resultat.clear();
                        m.erreur = e;
                    }
                }
            }
        });

        if !m.erreur.is_empty() {
            ui.colored_label(ui.visuals().error_fg_color, &m.erreur);
        }
        ui.add_space(6.0);
        ui.label("Résultat :");
        Self::champ_monospace(ui, "matrice_out", &m.resultat, 3);
    }

    /* ------------------------ Briques communes ------------------------ */

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 2);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([46.0, 28.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            self.action(action);
        }
    }

    fn action(&mut self, action: Action) {
        match action {
            Action::ClearEntree => self.clear_entree(),
            Action::ClearResultats => self.clear_resultats(),
            Action::ResetTotal => self.reset_total(),
            Action::Backspace => self.backspace_entree(),
            Action::MemoirePlus => self.memoire_cumule(1.0),
            Action::MemoireMoins => self.memoire_cumule(-1.0),
            Action::MemoireLire => self.inserer_valeur(self.session.memory_read()),
            Action::MemoireEffacer => self.session.memory_clear(),
            Action::DerniereReponse => self.inserer_valeur(self.session.recall_last_answer()),
        }
        self.focus_entree = true;
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            self.insert(to_insert, kind);
        }
    }

    fn insert(&mut self, to_insert: &str, kind: InsertKind) {
        match kind {
            InsertKind::CloseParen => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::OpenParen | InsertKind::Func => {
                let last = self.entree.chars().rev().find(|c| !c.is_whitespace());
                if let Some(c) = last {
                    if c.is_ascii_digit() || c.is_ascii_alphabetic() || c == ')' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::Op => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                if !self.entree.is_empty() {
                    self.entree.push(' ');
                }
                self.entree.push_str(to_insert);
                self.entree.push(' ');
            }
            InsertKind::Digit => {
                // chiffres: pas d’espaces auto
                self.entree.push_str(to_insert);
            }
            InsertKind::Word => {
                // mots: espace si juste avant c’est un chiffre ou ')'
                if let Some(c) = self.entree.chars().last() {
                    if c.is_ascii_digit() || c == ')' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
        }

        self.focus_entree = true;
    }

    /// DEL “intelligent” : retire d’un coup un appel de fonction ("sin(") ou une constante.
    fn backspace_entree(&mut self) {
        let fin = self.entree.trim_end().len();
        self.entree.truncate(fin);
        if self.entree.is_empty() {
            return;
        }

        let motif = fonctions::noms()
            .into_iter()
            .map(|nom| format!("{nom}("))
            .chain(["pi".to_string()])
            .filter(|m| self.entree.ends_with(m.as_str()))
            .max_by_key(String::len);

        match motif {
            Some(m) => {
                let fin = self.entree.len() - m.len();
                self.entree.truncate(fin);
            }
            None => {
                self.entree.pop();
            }
        }

        let fin = self.entree.trim_end().len();
        self.entree.truncate(fin);
    }

    /// Évalue l’entrée via le noyau, puis dépose résultat/démarche dans l’état UI.
    fn eval_via_noyau(&mut self) {
        let texte = self.entree.clone();
        match evaluate_line(&texte, &mut self.session) {
            Ok(r) => {
                let d = Demarche {
                    jetons: r.demarche.jetons,
                    arbre: r.demarche.arbre,
                    note: r.demarche.note,
                };
                self.set_resultat(&texte, r.affichage, d);
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }

    /// M+ (signe = 1) / M− (signe = -1) : valeur de l’entrée, sans toucher
    /// la session ; entrée vide = 0 ; échec = mémoire intacte.
    fn memoire_cumule(&mut self, signe: f64) {
        let valeur = if self.entree.trim().is_empty() {
            Ok(0.0)
        } else {
            evaluate_detached(&self.entree, &self.session)
        };

        let cumul = valeur.and_then(|v| {
            if signe < 0.0 {
                self.session.memory_subtract(v)
            } else {
                self.session.memory_add(v)
            }
        });
        if let Err(e) = cumul {
            self.set_erreur(e.to_string());
        }
    }
}

/// Onglet matrices : A (et B si binaire) -> opération -> texte.
fn calcul_matrices(m: &EtatMatrices) -> Result<String, String> {
    let a = parse_matrice(&m.a).map_err(|e| format!("A : {e}"))?;
    let b = if m.op.binaire() {
        Some(parse_matrice(&m.b).map_err(|e| format!("B : {e}"))?)
    } else {
        None
    };
    let r = calcule(m.op, &a, b.as_ref()).map_err(|e| e.to_string())?;
    format_resultat(&r, m.precision).map_err(|e| e.to_string())
}

/// Au-delà, une coordonnée est plaquée au bord : la fenêtre reste finie.
const LIMITE_MONDE: f64 = 1e150;

/// Fenêtre du graphe (coordonnées “monde”).
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bornes {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl Bornes {
    /// Boîte englobante des points présents ; repère orthonormé centré en polaire.
    fn de(points: &[Option<[f64; 2]>], polaire: bool) -> Option<Bornes> {
        let mut presents = points.iter().flatten().map(|&[x, y]| [plaque(x), plaque(y)]);
        let [x, y] = presents.next()?;
        let mut b = Bornes { x0: x, x1: x, y0: y, y1: y };
        for [x, y] in presents {
            b.x0 = b.x0.min(x);
            b.x1 = b.x1.max(x);
            b.y0 = b.y0.min(y);
            b.y1 = b.y1.max(y);
        }

        if polaire {
            let r = [b.x0, b.x1, b.y0, b.y1]
                .iter()
                .fold(0.0_f64, |acc, v| acc.max(v.abs()))
                .max(1e-9)
                * 1.05;
            return Some(Bornes { x0: -r, x1: r, y0: -r, y1: r });
        }

        ouvre(&mut b.x0, &mut b.x1);
        ouvre(&mut b.y0, &mut b.y1);
        let marge = (b.y1 - b.y0) * 0.05;
        b.y0 -= marge;
        b.y1 += marge;
        Some(b)
    }

    /// Position relative dans la fenêtre (0..1 dedans), toujours finie.
    fn relatif(&self, [x, y]: [f64; 2]) -> [f32; 2] {
        let rx = (plaque(x) - self.x0) / (self.x1 - self.x0);
        let ry = (plaque(y) - self.y0) / (self.y1 - self.y0);
        [rx.clamp(-1.0, 2.0) as f32, ry.clamp(-1.0, 2.0) as f32]
    }
}

fn plaque(v: f64) -> f64 {
    v.clamp(-LIMITE_MONDE, LIMITE_MONDE)
}

/// Intervalle dégénéré (constante) : on ouvre autour de la valeur,
/// proportionnellement à sa taille (1e150 ± 1 resterait plat).
fn ouvre(a: &mut f64, b: &mut f64) {
    let echelle = a.abs().max(b.abs());
    if *b - *a <= echelle * 1e-12 {
        let demi = (echelle * 0.5).max(1.0);
        *a -= demi;
        *b += demi;
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
    MemoirePlus,
    MemoireMoins,
    MemoireLire,
    MemoireEffacer,
    DerniereReponse,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Digit,
    Word,
    Func,
    Op,
    OpenParen,
    CloseParen,
}
