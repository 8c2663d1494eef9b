/// Player economy: gold to spend and life to lose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ledger {
    gold: u32,
    life: u32,
    initial_life: u32,
}

impl Ledger {
    /// Creates a ledger with the provided starting balances.
    #[must_use]
    pub const fn new(gold: u32, life: u32) -> Self {
        Self {
            gold,
            life,
            initial_life: life,
        }
    }

    /// Gold available to the player.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Remaining life.
    #[must_use]
    pub const fn life(&self) -> u32 {
        self.life
    }

    /// Share of the starting life that remains.
    #[must_use]
    pub fn life_ratio(&self) -> f32 {
        self.life as f32 / self.initial_life.max(1) as f32
    }

    /// Reports whether the player has no life left.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.life == 0
    }

    /// Credits the bounty of a killed enemy.
    pub fn on_enemy_killed(&mut self, bounty: u32) {
        self.gold = self.gold.saturating_add(bounty);
    }

    /// Deducts one life for an escaped enemy, never going below zero.
    pub fn on_enemy_escaped(&mut self) {
        self.life = self.life.saturating_sub(1);
    }

    /// Deducts `cost` if the player can afford it.
    pub fn try_spend(&mut self, cost: u32) -> bool {
        match self.gold.checked_sub(cost) {
            Some(remaining) => {
                self.gold = remaining;
                true
            }
            None => false,
        }
    }
}
