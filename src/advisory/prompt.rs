//! Natural-language rendering of a decision point
//!
//! The prompt has two parts: a state description (own roster, the acting
//! combatant, the opponent as far as it has been observed) and an action
//! menu that lists every legal option with the number to answer with.

use crate::core::types::{Condition, StatStages};
use crate::dex::{Accuracy, Category, Dex, Translations};
use crate::policy::{MoveCandidate, SwitchCandidate};
use crate::protocol::request::{SideInfo, SidePokemon};
use crate::tracker::BeliefState;

/// Everything the advisory service is shown for one slot
pub struct DecisionContext<'a> {
    /// Own roster snapshot from the request
    pub side: &'a SideInfo,
    /// Acting combatant, absent for a replacement after a faint
    pub actor: Option<&'a SidePokemon>,
    pub stages: &'a StatStages,
    pub can_transform: bool,
    /// Replacement decision rather than a regular turn
    pub forced: bool,
    pub moves: &'a [MoveCandidate],
    pub switches: &'a [SwitchCandidate],
    pub opponent: &'a BeliefState,
}

/// System prompt for regular and forced decisions
pub fn system_prompt(keyword: &str) -> String {
    format!(
        "You are an expert Pokemon Showdown singles player. Read the battle state, \
weigh type matchups, remaining HP, status conditions and stat changes on both \
sides, then pick the strongest legal action.\n\
Answer with exactly one directive and nothing else:\n\
- move X  (use move number X)\n\
- move X {keyword}  (use move X and {keyword})\n\
- switch X  (switch to team member number X)\n\
X is one of the numbers offered in the action list.",
        keyword = keyword
    )
}

pub struct PromptBuilder<'a> {
    dex: &'a dyn Dex,
    translations: &'a Translations,
    keyword: &'a str,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(dex: &'a dyn Dex, translations: &'a Translations, keyword: &'a str) -> Self {
        Self {
            dex,
            translations,
            keyword,
        }
    }

    /// Full user prompt: state, menu and the answer instruction
    pub fn build(&self, ctx: &DecisionContext) -> String {
        let mut prompt = self.describe_state(ctx);
        prompt.push('\n');
        prompt.push_str(&self.action_menu(ctx));
        prompt.push('\n');
        if ctx.forced {
            prompt.push_str(
                "Your active Pokemon must be replaced. Answer with \"switch X\" only.",
            );
        } else {
            prompt.push_str(&format!(
                "Choose the best action. Answer with \"move X\", \"move X {}\" or \"switch X\" only.",
                self.keyword
            ));
        }
        prompt
    }

    fn species_line(&self, species: &str, condition: &Condition) -> String {
        let mut line = self
            .translations
            .translate(Category::Pokemon, species)
            .to_string();
        if let Some(data) = self.dex.species(species) {
            if !data.types.is_empty() {
                let types: Vec<&str> = data
                    .types
                    .iter()
                    .map(|t| self.translations.translate(Category::Types, t))
                    .collect();
                line.push_str(&format!(" [{}]", types.join("/")));
            }
        }
        if condition.fainted {
            line.push_str(" fainted");
        } else {
            line.push_str(&format!(" HP:{}%", condition.percent()));
            if let Some(code) = condition.status.code() {
                let label = self.translations.translate(Category::Status, code);
                let label = if label == code {
                    condition.status.label()
                } else {
                    label
                };
                line.push_str(&format!(" ({})", label));
            }
        }
        line
    }

    fn move_summary(&self, name: &str) -> String {
        let data = self.dex.move_data(name);
        // request rosters list move ids, prefer the display name
        let display = data.map(|d| d.name.as_str()).unwrap_or(name);
        let mut summary = self
            .translations
            .translate(Category::Moves, display)
            .to_string();
        if let Some(data) = data {
            if !data.move_type.is_empty() {
                summary.push_str(&format!(
                    " [{}]",
                    self.translations.translate(Category::Types, &data.move_type)
                ));
            }
            if data.base_power > 0 {
                summary.push_str(&format!(" power {}", data.base_power));
            }
            match data.accuracy {
                Accuracy::Always => summary.push_str(" never misses"),
                Accuracy::Percent(p) => summary.push_str(&format!(" accuracy {}%", p)),
            }
        }
        summary
    }

    /// Both rosters and the acting combatant
    pub fn describe_state(&self, ctx: &DecisionContext) -> String {
        let mut state = String::from("== Your team ==\n");
        for (i, pokemon) in ctx.side.pokemon.iter().enumerate() {
            let mut line = format!(
                "{}. {}",
                i + 1,
                self.species_line(pokemon.species(), &pokemon.parsed_condition())
            );
            if pokemon.active {
                line.push_str(" (active)");
            }
            if let Some(ability) = pokemon.known_ability() {
                // request rosters carry ids, translations are keyed by name
                let name = self.dex.ability(ability).map_or(ability, |a| a.name.as_str());
                line.push_str(&format!(
                    " ability:{}",
                    self.translations.translate(Category::Abilities, name)
                ));
            }
            if let Some(item) = pokemon.item.as_deref() {
                let name = self.dex.item(item).map_or(item, |i| i.name.as_str());
                line.push_str(&format!(
                    " item:{}",
                    self.translations.translate(Category::Items, name)
                ));
            }
            if let Some(tera) = &pokemon.tera_type {
                line.push_str(&format!(" tera:{}", tera));
            }
            state.push_str(&line);
            state.push('\n');
            if !pokemon.moves.is_empty() {
                let moves: Vec<String> =
                    pokemon.moves.iter().map(|m| self.move_summary(m)).collect();
                state.push_str(&format!("   moves: {}\n", moves.join(", ")));
            }
        }

        if let Some(actor) = ctx.actor {
            state.push_str(&format!(
                "\n== Active: {} ==\n",
                self.translations.translate(Category::Pokemon, actor.species())
            ));
            let changes = ctx.stages.changes();
            if !changes.is_empty() {
                let changes: Vec<String> = changes
                    .iter()
                    .map(|(stat, value)| format!("{} {:+}", stat, value))
                    .collect();
                state.push_str(&format!("Stat changes: {}\n", changes.join(", ")));
            }
            if ctx.can_transform {
                state.push_str(&format!(
                    "Can {} this turn (tera type: {})\n",
                    self.keyword,
                    actor.tera_type.as_deref().unwrap_or("unknown")
                ));
            }
        }

        state.push_str("\n== Opponent team (seen so far) ==\n");
        if ctx.opponent.is_empty() {
            state.push_str("nothing revealed yet\n");
        }
        for (i, member) in ctx.opponent.iter().enumerate() {
            let mut line = format!(
                "{}. {}",
                i + 1,
                self.species_line(&member.species, &member.condition)
            );
            if member.active {
                line.push_str(" (active)");
            }
            state.push_str(&line);
            state.push('\n');
        }
        state
    }

    /// Every legal option, numbered the way the reply must name it
    pub fn action_menu(&self, ctx: &DecisionContext) -> String {
        let mut menu = String::from("== Available actions ==\n");
        for candidate in ctx.moves {
            let mut line = format!(
                "move {}: {}",
                candidate.index,
                self.move_summary(&candidate.name)
            );
            if let (Some(pp), Some(maxpp)) = (candidate.pp, candidate.maxpp) {
                line.push_str(&format!(" PP {}/{}", pp, maxpp));
            }
            if let Some(desc) = candidate
                .data
                .as_ref()
                .map(|d| d.short_desc.as_str())
                .filter(|d| !d.is_empty())
            {
                line.push_str(&format!(" ({})", desc));
            }
            menu.push_str(&line);
            menu.push('\n');
        }
        for candidate in ctx.switches {
            menu.push_str(&format!(
                "switch {}: {}\n",
                candidate.slot,
                self.species_line(&candidate.species, &candidate.condition)
            ));
        }
        menu
    }
}
