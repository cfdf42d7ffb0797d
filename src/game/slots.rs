//! Ability Slots & Selector
//!
//! Before play starts the player picks up to three abilities from the pool
//! of unlocked ones. Slot contents only ever move by swapping, so an ability
//! can never end up in two slots at once.

use crate::core::Vec2;
use crate::game::ability::AbilityId;
use crate::game::input::Key;
use crate::SCREEN_WIDTH;

/// Pool slot icon width.
const POOL_SLOT_SIZE: f32 = 64.0;
/// Gap between pool slots.
const POOL_SLOT_PADDING: f32 = 30.0;
/// Equipped slot icon width.
const ACTIVE_SLOT_SIZE: f32 = 128.0;
/// Gap between equipped slots.
const ACTIVE_SLOT_PADDING: f32 = 60.0;

/// HUD slot positions once play starts.
pub const HUD_SLOT_POSITIONS: [Vec2; 3] = [Vec2::new(40.0, 40.0), Vec2::new(90.0, 40.0), Vec2::new(140.0, 40.0)];

/// One ability slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilitySlot {
    /// Centre of the slot on screen
    pub position: Vec2,
    /// Icon scale
    pub scale: f32,
    /// Ability held, if any
    pub ability: Option<AbilityId>,
    /// Highlighted in the selector
    pub selected: bool,
}

impl AbilitySlot {
    /// Slot at `position`.
    pub fn new(position: Vec2, scale: f32, ability: Option<AbilityId>) -> Self {
        Self {
            position,
            scale,
            ability,
            selected: false,
        }
    }

    /// Whether the slot holds nothing.
    pub fn is_empty(&self) -> bool {
        self.ability.is_none()
    }
}

/// Exchange the contents of two slots.
///
/// Swapping with an empty slot moves the ability across and leaves the
/// source empty.
pub fn swap_abilities(a: &mut AbilitySlot, b: &mut AbilitySlot) {
    std::mem::swap(&mut a.ability, &mut b.ability);
}

// =============================================================================
// SELECTOR
// =============================================================================

/// Pre-play ability picker.
#[derive(Clone, Debug)]
pub struct AbilitySelector {
    pool: Vec<AbilitySlot>,
    equipped: [AbilitySlot; 3],
    highlighted: Option<usize>,
    forced: Option<AbilityId>,
    open: bool,
}

impl AbilitySelector {
    /// Lay out the pool of `unlocked` abilities and three equipped slots.
    ///
    /// A `forced` ability is pre-equipped in slot 0 and cannot be swapped out.
    pub fn new(unlocked: &[AbilityId], forced: Option<AbilityId>) -> Self {
        let count = unlocked.len() as f32;
        let mut x = SCREEN_WIDTH * 0.5
            - (POOL_SLOT_SIZE + POOL_SLOT_PADDING) * count * 0.5
            - POOL_SLOT_SIZE * 0.5
            - POOL_SLOT_PADDING * 0.5;

        let mut pool = Vec::with_capacity(unlocked.len());
        for &ability in unlocked {
            x += POOL_SLOT_SIZE + POOL_SLOT_PADDING;
            pool.push(AbilitySlot::new(Vec2::new(x, 470.0), 2.0, Some(ability)));
        }

        let highlighted = if pool.is_empty() { None } else { Some(0) };
        if let Some(first) = pool.first_mut() {
            first.selected = true;
        }

        let equipped_y = if pool.is_empty() { 500.0 } else { 700.0 };
        let mut x = SCREEN_WIDTH * 0.5 - (ACTIVE_SLOT_PADDING + ACTIVE_SLOT_SIZE) * 2.0;
        let equipped = std::array::from_fn(|i| {
            x += ACTIVE_SLOT_SIZE + ACTIVE_SLOT_PADDING;
            let ability = if i == 0 { forced } else { None };
            AbilitySlot::new(Vec2::new(x, equipped_y), 4.0, ability)
        });

        Self {
            pool,
            equipped,
            highlighted,
            forced,
            open: true,
        }
    }

    /// Still choosing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Unlocked-ability slots.
    pub fn pool(&self) -> &[AbilitySlot] {
        &self.pool
    }

    /// The three equipped slots.
    pub fn equipped(&self) -> &[AbilitySlot; 3] {
        &self.equipped
    }

    /// Index of the highlighted pool slot.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Ability the level forces into slot 0.
    pub fn forced(&self) -> Option<AbilityId> {
        self.forced
    }

    /// Equipped abilities by key slot.
    pub fn selection(&self) -> [Option<AbilityId>; 3] {
        self.equipped.map(|slot| slot.ability)
    }

    /// React to a released key. Returns the final selection when confirmed.
    pub fn handle_release(&mut self, key: Key) -> Option<[Option<AbilityId>; 3]> {
        if !self.open {
            return None;
        }

        if key == Key::Space {
            self.open = false;
            for (slot, position) in self.equipped.iter_mut().zip(HUD_SLOT_POSITIONS) {
                slot.position = position;
                slot.scale = 2.0;
            }
            return Some(self.selection());
        }

        // Only the forced ability: nothing to rearrange
        let highlighted = self.highlighted?;

        match key {
            Key::Num1 | Key::J if self.forced.is_none() => self.swap_with_equipped(0, highlighted),
            Key::Num2 | Key::K => self.swap_with_equipped(1, highlighted),
            Key::Num3 | Key::L => self.swap_with_equipped(2, highlighted),
            Key::Return | Key::S | Key::W => {
                if let Some(empty) = self.equipped.iter().position(AbilitySlot::is_empty) {
                    self.swap_with_equipped(empty, highlighted);
                }
            }
            Key::Left | Key::A => {
                let next = highlighted.checked_sub(1).unwrap_or(self.pool.len() - 1);
                self.highlight(next);
            }
            Key::Right | Key::D => {
                let next = (highlighted + 1) % self.pool.len();
                self.highlight(next);
            }
            _ => {}
        }
        None
    }

    fn swap_with_equipped(&mut self, equipped: usize, pool: usize) {
        if let (Some(a), Some(b)) = (self.equipped.get_mut(equipped), self.pool.get_mut(pool)) {
            swap_abilities(a, b);
        }
    }

    fn highlight(&mut self, index: usize) {
        for (i, slot) in self.pool.iter_mut().enumerate() {
            slot.selected = i == index;
        }
        self.highlighted = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> AbilitySelector {
        AbilitySelector::new(&[AbilityId::Bowland, AbilityId::Cartmel, AbilityId::Fylde], None)
    }

    #[test]
    fn test_swap_exchanges_contents() {
        let mut a = AbilitySlot::new(Vec2::ZERO, 1.0, Some(AbilityId::Bowland));
        let mut b = AbilitySlot::new(Vec2::ZERO, 1.0, Some(AbilityId::Pendle));
        swap_abilities(&mut a, &mut b);
        assert_eq!(a.ability, Some(AbilityId::Pendle));
        assert_eq!(b.ability, Some(AbilityId::Bowland));
    }

    #[test]
    fn test_move_into_empty_leaves_source_empty() {
        let mut a = AbilitySlot::new(Vec2::ZERO, 1.0, Some(AbilityId::County));
        let mut b = AbilitySlot::new(Vec2::ZERO, 1.0, None);
        swap_abilities(&mut a, &mut b);
        assert!(a.is_empty());
        assert_eq!(b.ability, Some(AbilityId::County));
    }

    #[test]
    fn test_return_fills_first_empty_slot() {
        let mut sel = selector();
        sel.handle_release(Key::Return);
        assert_eq!(sel.selection(), [Some(AbilityId::Bowland), None, None]);
        assert!(sel.pool()[0].is_empty());

        sel.handle_release(Key::D);
        sel.handle_release(Key::W);
        assert_eq!(sel.selection(), [Some(AbilityId::Bowland), Some(AbilityId::Cartmel), None]);
    }

    #[test]
    fn test_number_keys_swap_and_never_duplicate() {
        let mut sel = selector();
        sel.handle_release(Key::Num2);
        sel.handle_release(Key::Right);
        sel.handle_release(Key::K);

        // Cartmel swapped into slot 1, Bowland pushed back into the pool
        assert_eq!(sel.selection(), [None, Some(AbilityId::Cartmel), None]);
        let pool: Vec<_> = sel.pool().iter().map(|s| s.ability).collect();
        assert_eq!(pool, vec![None, Some(AbilityId::Bowland), Some(AbilityId::Fylde)]);
    }

    #[test]
    fn test_highlight_wraps() {
        let mut sel = selector();
        sel.handle_release(Key::Left);
        assert_eq!(sel.highlighted(), Some(2));
        assert!(sel.pool()[2].selected);
        assert!(!sel.pool()[0].selected);
        sel.handle_release(Key::Right);
        assert_eq!(sel.highlighted(), Some(0));
    }

    #[test]
    fn test_forced_slot_locked() {
        let mut sel = AbilitySelector::new(&[AbilityId::Bowland], Some(AbilityId::Lonsdale));
        sel.handle_release(Key::J);
        assert_eq!(sel.selection()[0], Some(AbilityId::Lonsdale));

        sel.handle_release(Key::Return);
        assert_eq!(sel.selection(), [Some(AbilityId::Lonsdale), Some(AbilityId::Bowland), None]);
    }

    #[test]
    fn test_space_confirms_and_moves_to_hud() {
        let mut sel = AbilitySelector::new(&[], Some(AbilityId::Pendle));
        assert_eq!(sel.handle_release(Key::Right), None);
        let confirmed = sel.handle_release(Key::Space);
        assert_eq!(confirmed, Some([Some(AbilityId::Pendle), None, None]));
        assert!(!sel.is_open());
        assert_eq!(sel.equipped()[0].position, HUD_SLOT_POSITIONS[0]);

        // Closed selectors ignore keys
        assert_eq!(sel.handle_release(Key::Space), None);
    }
}
