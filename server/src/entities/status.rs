//! Resource/stat container with timed effects.

use skirmish_shared::{EffectSnapshot, Stat, StatBlock, StatusSnapshot};

/// A timed, reversible modification of one stat
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub stat: Stat,
    pub value: f32,
    /// Ticks left before the effect is reverted
    pub remaining: u32,
    applied: bool,
}

impl Effect {
    pub fn new(stat: Stat, value: f32, duration: u32) -> Self {
        Self {
            stat,
            value,
            remaining: duration,
            applied: false,
        }
    }
}

/// Per-entity stats.
///
/// Current resource values are not clamped on every mutation. Code that
/// changes hp/mana/stamina (combat, consumables, regen) clamps to `[0, max]`.
#[derive(Debug, Clone)]
pub struct Status {
    pub hp: f32,
    pub max_hp: f32,
    pub hp_regen: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub mana_regen: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub stamina_regen: f32,
    pub damage: f32,
    pub critical: f32,
    pub defense: f32,
    pub speed: f32,
    pub acceleration: f32,
    effects: Vec<Effect>,
}

impl Status {
    pub fn from_block(block: &StatBlock) -> Self {
        Self {
            hp: block.hp,
            max_hp: block.max_hp,
            hp_regen: block.hp_regen,
            mana: block.mana,
            max_mana: block.max_mana,
            mana_regen: block.mana_regen,
            stamina: block.stamina,
            max_stamina: block.max_stamina,
            stamina_regen: block.stamina_regen,
            damage: block.damage,
            critical: block.critical,
            defense: block.defense,
            speed: block.speed,
            acceleration: block.acceleration,
            effects: Vec::new(),
        }
    }

    /// Stats with timed effects stripped, for persistence
    pub fn to_block(&self) -> StatBlock {
        let mut base = self.clone();
        for effect in &self.effects {
            if effect.applied {
                *base.stat_mut(effect.stat) -= effect.value;
            }
        }
        StatBlock {
            hp: base.hp,
            max_hp: base.max_hp,
            hp_regen: base.hp_regen,
            mana: base.mana,
            max_mana: base.max_mana,
            mana_regen: base.mana_regen,
            stamina: base.stamina,
            max_stamina: base.max_stamina,
            stamina_regen: base.stamina_regen,
            damage: base.damage,
            critical: base.critical,
            defense: base.defense,
            speed: base.speed,
            acceleration: base.acceleration,
        }
    }

    fn stat_mut(&mut self, stat: Stat) -> &mut f32 {
        match stat {
            Stat::Hp => &mut self.hp,
            Stat::MaxHp => &mut self.max_hp,
            Stat::HpRegen => &mut self.hp_regen,
            Stat::Mana => &mut self.mana,
            Stat::MaxMana => &mut self.max_mana,
            Stat::ManaRegen => &mut self.mana_regen,
            Stat::Stamina => &mut self.stamina,
            Stat::MaxStamina => &mut self.max_stamina,
            Stat::StaminaRegen => &mut self.stamina_regen,
            Stat::Damage => &mut self.damage,
            Stat::Critical => &mut self.critical,
            Stat::Defense => &mut self.defense,
            Stat::Speed => &mut self.speed,
            Stat::Acceleration => &mut self.acceleration,
        }
    }

    pub fn get(&self, stat: Stat) -> f32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::MaxHp => self.max_hp,
            Stat::HpRegen => self.hp_regen,
            Stat::Mana => self.mana,
            Stat::MaxMana => self.max_mana,
            Stat::ManaRegen => self.mana_regen,
            Stat::Stamina => self.stamina,
            Stat::MaxStamina => self.max_stamina,
            Stat::StaminaRegen => self.stamina_regen,
            Stat::Damage => self.damage,
            Stat::Critical => self.critical,
            Stat::Defense => self.defense,
            Stat::Speed => self.speed,
            Stat::Acceleration => self.acceleration,
        }
    }

    pub fn set(&mut self, stat: Stat, value: f32) {
        *self.stat_mut(stat) = value;
    }

    /// Add `value` to a stat without clamping
    pub fn buff(&mut self, stat: Stat, value: f32) {
        *self.stat_mut(stat) += value;
    }

    /// Add `value` to a stat, keeping resources inside `[0, max]`
    pub fn buff_clamped(&mut self, stat: Stat, value: f32) {
        let mut next = self.get(stat) + value;
        if let Some(max) = stat.max_pair() {
            next = next.min(self.get(max));
        }
        if stat.max_pair().is_some() {
            next = next.max(0.0);
        }
        self.set(stat, next);
    }

    pub fn add_effect(&mut self, mut effect: Effect) {
        self.buff(effect.stat, effect.value);
        effect.applied = true;
        self.effects.push(effect);
    }

    /// Tick every active effect once and revert the ones that ran out
    pub fn update_effects(&mut self) {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| {
            effect.remaining = effect.remaining.saturating_sub(1);
            if effect.remaining > 0 {
                return true;
            }
            if effect.applied {
                effect.applied = false;
                expired.push((effect.stat, effect.value));
            }
            false
        });
        for (stat, value) in expired {
            self.buff(stat, -value);
        }
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// One second worth of regeneration
    pub fn regenerate(&mut self) {
        self.buff_clamped(Stat::Hp, self.hp_regen);
        self.buff_clamped(Stat::Mana, self.mana_regen);
        self.buff_clamped(Stat::Stamina, self.stamina_regen);
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            hp: self.hp.max(0.0),
            max_hp: self.max_hp,
            hp_regen: self.hp_regen,
            mana: self.mana.max(0.0),
            max_mana: self.max_mana,
            mana_regen: self.mana_regen,
            stamina: self.stamina.max(0.0),
            max_stamina: self.max_stamina,
            stamina_regen: self.stamina_regen,
            damage: self.damage,
            critical: self.critical,
            defense: self.defense,
            speed: self.speed,
            acceleration: self.acceleration,
            effects: self
                .effects
                .iter()
                .map(|e| EffectSnapshot {
                    stat: e.stat,
                    value: e.value,
                    remaining: e.remaining,
                })
                .collect(),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::from_block(&StatBlock::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_reverts_exactly_once() {
        let mut status = Status::default();
        let base = status.speed;
        status.add_effect(Effect::new(Stat::Speed, 1.5, 3));
        assert!((status.speed - (base + 1.5)).abs() < 0.001);

        status.update_effects();
        status.update_effects();
        assert!((status.speed - (base + 1.5)).abs() < 0.001);

        status.update_effects();
        assert!((status.speed - base).abs() < 0.001);
        assert!(status.effects().is_empty());

        // Extra updates must not revert again
        for _ in 0..5 {
            status.update_effects();
        }
        assert!((status.speed - base).abs() < 0.001);
    }

    #[test]
    fn test_overlapping_effects_each_revert() {
        let mut status = Status::default();
        let base = status.defense;
        status.add_effect(Effect::new(Stat::Defense, 4.0, 1));
        status.add_effect(Effect::new(Stat::Defense, -1.0, 2));
        assert!((status.defense - (base + 3.0)).abs() < 0.001);

        status.update_effects();
        assert!((status.defense - (base - 1.0)).abs() < 0.001);
        assert_eq!(status.effects().len(), 1);

        status.update_effects();
        assert!((status.defense - base).abs() < 0.001);
    }

    #[test]
    fn test_zero_duration_effect_reverts_on_first_update() {
        let mut status = Status::default();
        let base = status.damage;
        status.add_effect(Effect::new(Stat::Damage, 10.0, 0));
        status.update_effects();
        assert!((status.damage - base).abs() < 0.001);
    }

    #[test]
    fn test_buff_clamped_keeps_resources_in_range() {
        let mut status = Status::default();
        status.hp = 90.0;
        status.buff_clamped(Stat::Hp, 50.0);
        assert!((status.hp - status.max_hp).abs() < 0.001);

        status.buff_clamped(Stat::Mana, -500.0);
        assert_eq!(status.mana, 0.0);

        // Non-resource stats are not clamped
        status.buff_clamped(Stat::Defense, -3.0);
        assert!((status.defense + 3.0).abs() < 0.001);
    }

    #[test]
    fn test_to_block_strips_active_effects() {
        let mut status = Status::default();
        status.add_effect(Effect::new(Stat::Speed, 3.0, 100));
        let block = status.to_block();
        assert!((block.speed - StatBlock::default().speed).abs() < 0.001);
    }

    #[test]
    fn test_regenerate_caps_at_max() {
        let mut status = Status::default();
        status.hp = status.max_hp - 0.5;
        status.regenerate();
        assert!((status.hp - status.max_hp).abs() < 0.001);
    }
}
