//! Item catalog and template resolution.
//!
//! Narrative rewards arrive as free-form names. Resolution first checks the
//! catalog by exact name (case-insensitive), then falls back to synthesizing
//! a plausible item from keywords in the name.

use crate::world::{Item, ItemEffect, ItemRarity, ItemType};

/// Look up a catalog item by name, case-insensitively.
pub fn find_template(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    CATALOG
        .iter()
        .find(|item| item.name.to_lowercase() == name_lower)
        .cloned()
}

/// Resolve a free-form item name into a concrete item: a catalog match if
/// one exists, otherwise a synthesized item. Always succeeds.
pub fn resolve_item(name: &str, quantity: u32) -> Item {
    let mut item = find_template(name).unwrap_or_else(|| synthesize_item(name));
    item.quantity = quantity;
    item
}

/// Guess an item's type from keywords in its name.
fn guess_type(name_lower: &str) -> ItemType {
    const WEAPON_WORDS: [&str; 8] = [
        "sword", "axe", "bow", "dagger", "mace", "spear", "hammer", "blade",
    ];
    const ARMOR_WORDS: [&str; 5] = ["armor", "shield", "mail", "plate", "helm"];
    const CONSUMABLE_WORDS: [&str; 4] = ["potion", "elixir", "draught", "tonic"];

    if WEAPON_WORDS.iter().any(|w| name_lower.contains(w)) {
        ItemType::Weapon
    } else if ARMOR_WORDS.iter().any(|w| name_lower.contains(w)) {
        ItemType::Armor
    } else if CONSUMABLE_WORDS.iter().any(|w| name_lower.contains(w)) {
        ItemType::Consumable
    } else if name_lower.contains("scroll") {
        ItemType::Scroll
    } else {
        ItemType::Trinket
    }
}

/// Guess rarity from qualifier words in the name.
fn guess_rarity(name_lower: &str) -> ItemRarity {
    if name_lower.contains("legendary") {
        ItemRarity::Legendary
    } else if name_lower.contains("epic") || name_lower.contains("greater") {
        ItemRarity::Epic
    } else if name_lower.contains("rare") || name_lower.contains("fine") {
        ItemRarity::Rare
    } else {
        ItemRarity::Common
    }
}

/// Build a plausible item for a name the catalog doesn't know. Weapons get
/// rarity-scaled damage dice; consumables get rarity-scaled healing.
pub fn synthesize_item(name: &str) -> Item {
    let name_lower = name.to_lowercase();
    let item_type = guess_type(&name_lower);
    let rarity = guess_rarity(&name_lower);

    let item = Item::new(name, item_type).with_rarity(rarity);
    match item_type {
        ItemType::Weapon => {
            let notation = match rarity {
                ItemRarity::Common => "1d6",
                ItemRarity::Rare => "1d8",
                ItemRarity::Epic => "1d10",
                ItemRarity::Legendary => "2d6",
            };
            item.with_damage(notation, "slashing")
                .with_description("A serviceable weapon.")
        }
        ItemType::Consumable => {
            let notation = match rarity {
                ItemRarity::Common => "2d4+2",
                ItemRarity::Rare => "4d4+4",
                ItemRarity::Epic => "8d4+8",
                ItemRarity::Legendary => "10d4+20",
            };
            item.with_effect(ItemEffect::Healing {
                notation: notation.to_string(),
            })
            .with_description("A restorative brew.")
        }
        ItemType::Armor => item.with_description("Protective gear."),
        ItemType::Scroll => item.with_description("A scroll inscribed with faded runes."),
        ItemType::Trinket => item.with_description("A curious keepsake."),
    }
}

// ============================================================================
// Catalog
// ============================================================================

lazy_static::lazy_static! {
    /// Known item templates, matched by exact name.
    pub static ref CATALOG: Vec<Item> = vec![
        // Weapons
        Item::new("Shortsword", ItemType::Weapon)
            .with_damage("1d6", "piercing")
            .with_description("A light, versatile blade."),
        Item::new("Longsword", ItemType::Weapon)
            .with_damage("1d8", "slashing")
            .with_description("The classic soldier's sword."),
        Item::new("Greatsword", ItemType::Weapon)
            .with_damage("2d6", "slashing")
            .with_description("A heavy two-handed blade."),
        Item::new("Battleaxe", ItemType::Weapon)
            .with_damage("1d8", "slashing")
            .with_description("A broad-bladed axe."),
        Item::new("Dagger", ItemType::Weapon)
            .with_damage("1d4", "piercing")
            .with_description("Small, quick, easy to conceal."),
        Item::new("Shortbow", ItemType::Weapon)
            .with_damage("1d6", "piercing")
            .with_description("A compact hunting bow."),
        Item::new("Longbow", ItemType::Weapon)
            .with_damage("1d8", "piercing")
            .with_rarity(ItemRarity::Rare)
            .with_description("A tall yew bow with serious reach."),
        Item::new("Warhammer", ItemType::Weapon)
            .with_damage("1d8", "bludgeoning")
            .with_description("A crushing one-handed hammer."),
        Item::new("Flametongue Sword", ItemType::Weapon)
            .with_damage("1d8", "fire")
            .with_rarity(ItemRarity::Epic)
            .with_description("A blade wreathed in flame when drawn."),

        // Armor
        Item::new("Leather Armor", ItemType::Armor)
            .with_description("Supple boiled leather."),
        Item::new("Chain Mail", ItemType::Armor)
            .with_rarity(ItemRarity::Rare)
            .with_description("Interlocking steel rings."),
        Item::new("Plate Armor", ItemType::Armor)
            .with_rarity(ItemRarity::Epic)
            .with_description("Full plate, fitted and polished."),
        Item::new("Shield", ItemType::Armor)
            .with_description("A sturdy wooden shield rimmed in iron."),

        // Consumables
        Item::new("Healing Potion", ItemType::Consumable)
            .with_effect(ItemEffect::Healing { notation: "2d4+2".to_string() })
            .with_description("A red draught that knits wounds closed."),
        Item::new("Greater Healing Potion", ItemType::Consumable)
            .with_rarity(ItemRarity::Rare)
            .with_effect(ItemEffect::Healing { notation: "4d4+4".to_string() })
            .with_description("A deeper red, a deeper mend."),
        Item::new("Superior Healing Potion", ItemType::Consumable)
            .with_rarity(ItemRarity::Epic)
            .with_effect(ItemEffect::Healing { notation: "8d4+8".to_string() })
            .with_description("Reserved for the worst days."),
        Item::new("Elixir of Fortitude", ItemType::Consumable)
            .with_rarity(ItemRarity::Rare)
            .with_effect(ItemEffect::TemporaryHitPoints { amount: 10 })
            .with_description("Steadies the body against the next blow."),

        // Scrolls
        Item::new("Scroll of Mending", ItemType::Scroll)
            .with_effect(ItemEffect::Healing { notation: "1d8".to_string() })
            .with_description("A minor restorative incantation."),
        Item::new("Scroll of Warding", ItemType::Scroll)
            .with_rarity(ItemRarity::Rare)
            .with_effect(ItemEffect::TemporaryHitPoints { amount: 5 })
            .with_description("A brief protective sigil."),

        // Trinkets
        Item::new("Torch", ItemType::Trinket)
            .with_description("Burns for about an hour."),
        Item::new("Rope", ItemType::Trinket)
            .with_description("Fifty feet of hemp rope."),
        Item::new("Lockpicks", ItemType::Trinket)
            .with_description("For doors that disagree with you."),
        Item::new("Lucky Coin", ItemType::Trinket)
            .with_description("Worn smooth by a nervous thumb."),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_template_case_insensitive() {
        let sword = find_template("longsword").unwrap();
        assert_eq!(sword.name, "Longsword");
        assert_eq!(sword.damage.as_deref(), Some("1d8"));

        assert!(find_template("Vorpal Whatsit").is_none());
    }

    #[test]
    fn test_resolve_prefers_catalog() {
        let potion = resolve_item("Healing Potion", 3);
        assert_eq!(potion.quantity, 3);
        assert!(matches!(potion.effect, ItemEffect::Healing { .. }));
    }

    #[test]
    fn test_synthesize_weapon_keywords() {
        let item = synthesize_item("Rusty Axe");
        assert_eq!(item.item_type, ItemType::Weapon);
        assert_eq!(item.rarity, ItemRarity::Common);
        assert!(item.damage.is_some());
    }

    #[test]
    fn test_synthesize_rarity_keywords() {
        assert_eq!(
            synthesize_item("Legendary Blade of Dawn").rarity,
            ItemRarity::Legendary
        );
        assert_eq!(
            synthesize_item("Greater Elixir of Vigor").rarity,
            ItemRarity::Epic
        );
        assert_eq!(synthesize_item("Fine Dagger").rarity, ItemRarity::Rare);
    }

    #[test]
    fn test_synthesize_consumable_heals_by_rarity() {
        let item = synthesize_item("Greater Healing Draught");
        assert_eq!(item.item_type, ItemType::Consumable);
        assert_eq!(
            item.effect,
            ItemEffect::Healing {
                notation: "8d4+8".to_string()
            }
        );
    }

    #[test]
    fn test_synthesize_unknown_falls_back_to_trinket() {
        let item = synthesize_item("Mysterious Feather");
        assert_eq!(item.item_type, ItemType::Trinket);
        assert_eq!(item.effect, ItemEffect::None);
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<String> = CATALOG.iter().map(|i| i.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }
}
