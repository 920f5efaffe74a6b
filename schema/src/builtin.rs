//! Built-in field tables.
//!
//! These cover the fields most captures touch. Fields missing here are
//! skipped with a warning by `Values` entries, so a larger table can be
//! loaded from JSON without touching the decoder.

use crate::{ObjectType, SchemaTable, TypeLayout, ValueShape};

use ValueShape::{Bytes, Float, Floats, Guid, Int32, UInt32, UInt64, UInts};

/// First block after the fields shared by every object.
pub const OBJECT_END: u16 = 0x0C;

/// Field table for client builds 6.0.2 through 6.0.3.
#[must_use]
pub fn v6_0_2() -> SchemaTable {
    const O: u16 = OBJECT_END;

    let object = TypeLayout::new(ObjectType::Object)
        .field(0x00, "OBJECT_FIELD_GUID", Guid)
        .field(0x04, "OBJECT_FIELD_DATA", Guid)
        .field(0x08, "OBJECT_FIELD_TYPE", UInt32)
        .field(0x09, "OBJECT_FIELD_ENTRY_ID", UInt32)
        .field(0x0A, "OBJECT_FIELD_DYNAMIC_FLAGS", UInt32)
        .field(0x0B, "OBJECT_FIELD_SCALE_X", Float);

    let item = TypeLayout::new(ObjectType::Item)
        .extends(ObjectType::Object)
        .field(O, "ITEM_FIELD_OWNER", Guid)
        .field(O + 0x04, "ITEM_FIELD_CONTAINED_IN", Guid)
        .field(O + 0x08, "ITEM_FIELD_CREATOR", Guid)
        .field(O + 0x0C, "ITEM_FIELD_GIFTCREATOR", Guid)
        .field(O + 0x10, "ITEM_FIELD_STACK_COUNT", UInt32)
        .field(O + 0x11, "ITEM_FIELD_EXPIRATION", UInt32)
        .field(O + 0x12, "ITEM_FIELD_SPELL_CHARGES", UInts { count: 5 })
        .field(O + 0x17, "ITEM_FIELD_DYNAMIC_FLAGS", UInt32)
        .field(O + 0x18, "ITEM_FIELD_ENCHANTMENT", UInts { count: 39 })
        .field(O + 0x3F, "ITEM_FIELD_PROPERTY_SEED", UInt32)
        .field(O + 0x40, "ITEM_FIELD_RANDOM_PROPERTIES_ID", Int32)
        .field(O + 0x41, "ITEM_FIELD_DURABILITY", UInt32)
        .field(O + 0x42, "ITEM_FIELD_MAX_DURABILITY", UInt32)
        .field(O + 0x43, "ITEM_FIELD_CREATE_PLAYED_TIME", UInt32)
        .field(O + 0x44, "ITEM_FIELD_MODIFIERS_MASK", UInt32)
        .field(O + 0x45, "ITEM_FIELD_CONTEXT", UInt32)
        .dynamic(0, "ITEM_DYNAMIC_FIELD_MODIFIERS")
        .dynamic(1, "ITEM_DYNAMIC_FIELD_BONUSLIST_IDS");

    let item_end = O + 0x46;
    let container = TypeLayout::new(ObjectType::Container)
        .extends(ObjectType::Item)
        .field(item_end, "CONTAINER_FIELD_SLOTS", UInts { count: 144 })
        .field(item_end + 0x90, "CONTAINER_FIELD_NUM_SLOTS", UInt32);

    let unit = TypeLayout::new(ObjectType::Unit)
        .extends(ObjectType::Object)
        .field(O, "UNIT_FIELD_CHARM", Guid)
        .field(O + 0x04, "UNIT_FIELD_SUMMON", Guid)
        .field(O + 0x08, "UNIT_FIELD_CRITTER", Guid)
        .field(O + 0x0C, "UNIT_FIELD_CHARMEDBY", Guid)
        .field(O + 0x10, "UNIT_FIELD_SUMMONEDBY", Guid)
        .field(O + 0x14, "UNIT_FIELD_CREATEDBY", Guid)
        .field(O + 0x18, "UNIT_FIELD_DEMON_CREATOR", Guid)
        .field(O + 0x1C, "UNIT_FIELD_TARGET", Guid)
        .field(O + 0x20, "UNIT_FIELD_BATTLE_PET_COMPANION_GUID", Guid)
        .field(O + 0x24, "UNIT_FIELD_BATTLE_PET_DB_ID", UInt64)
        .field(O + 0x26, "UNIT_FIELD_CHANNEL_OBJECT", Guid)
        .field(O + 0x2A, "UNIT_FIELD_CHANNEL_SPELL", UInt32)
        .field(O + 0x2B, "UNIT_FIELD_SUMMONED_BY_HOME_REALM", UInt32)
        .field(O + 0x2C, "UNIT_FIELD_SEX", Bytes)
        .field(O + 0x2D, "UNIT_FIELD_DISPLAY_POWER", UInt32)
        .field(O + 0x2E, "UNIT_FIELD_OVERRIDE_DISPLAY_POWER_ID", UInt32)
        .field(O + 0x2F, "UNIT_FIELD_HEALTH", UInt32)
        .field(O + 0x30, "UNIT_FIELD_POWER", UInts { count: 6 })
        .field(O + 0x36, "UNIT_FIELD_MAXHEALTH", UInt32)
        .field(O + 0x37, "UNIT_FIELD_MAXPOWER", UInts { count: 6 })
        .field(O + 0x3D, "UNIT_FIELD_POWER_REGEN_FLAT_MODIFIER", Floats { count: 6 })
        .field(
            O + 0x43,
            "UNIT_FIELD_POWER_REGEN_INTERRUPTED_FLAT_MODIFIER",
            Floats { count: 6 },
        )
        .field(O + 0x49, "UNIT_FIELD_LEVEL", UInt32)
        .field(O + 0x4A, "UNIT_FIELD_EFFECTIVE_LEVEL", UInt32)
        .field(O + 0x4B, "UNIT_FIELD_FACTIONTEMPLATE", UInt32)
        .field(O + 0x4C, "UNIT_VIRTUAL_ITEM_ID", UInts { count: 3 })
        .field(O + 0x4F, "UNIT_FIELD_FLAGS", UInt32)
        .field(O + 0x50, "UNIT_FIELD_FLAGS2", UInt32)
        .field(O + 0x51, "UNIT_FIELD_FLAGS3", UInt32)
        .field(O + 0x52, "UNIT_FIELD_AURASTATE", UInt32)
        .field(O + 0x53, "UNIT_FIELD_BASEATTACKTIME", UInts { count: 2 })
        .field(O + 0x55, "UNIT_FIELD_RANGEDATTACKTIME", UInt32)
        .field(O + 0x56, "UNIT_FIELD_BOUNDINGRADIUS", Float)
        .field(O + 0x57, "UNIT_FIELD_COMBATREACH", Float)
        .field(O + 0x58, "UNIT_FIELD_DISPLAYID", UInt32)
        .field(O + 0x59, "UNIT_FIELD_NATIVEDISPLAYID", UInt32)
        .field(O + 0x5A, "UNIT_FIELD_MOUNTDISPLAYID", UInt32)
        .field(O + 0x5B, "UNIT_FIELD_MINDAMAGE", Float)
        .field(O + 0x5C, "UNIT_FIELD_MAXDAMAGE", Float)
        .field(O + 0x5D, "UNIT_FIELD_MINOFFHANDDAMAGE", Float)
        .field(O + 0x5E, "UNIT_FIELD_MAXOFFHANDDAMAGE", Float)
        .field(O + 0x5F, "UNIT_FIELD_ANIM_TIER", Bytes)
        .field(O + 0x60, "UNIT_FIELD_PETNUMBER", UInt32)
        .field(O + 0x61, "UNIT_FIELD_PET_NAME_TIMESTAMP", UInt32)
        .field(O + 0x62, "UNIT_FIELD_PETEXPERIENCE", UInt32)
        .field(O + 0x63, "UNIT_FIELD_PETNEXTLEVELEXP", UInt32)
        .field(O + 0x64, "UNIT_FIELD_MOD_CASTING_SPEED", Float)
        .dynamic(0, "UNIT_DYNAMIC_FIELD_PASSIVE_SPELLS")
        .dynamic(1, "UNIT_DYNAMIC_FIELD_WORLD_EFFECTS");

    // player-only fields follow the whole unit block; none are listed yet
    let player = TypeLayout::new(ObjectType::Player).extends(ObjectType::Unit);

    let game_object = TypeLayout::new(ObjectType::GameObject)
        .extends(ObjectType::Object)
        .field(O, "GAMEOBJECT_FIELD_CREATED_BY", Guid)
        .field(O + 0x04, "GAMEOBJECT_DISPLAYID", UInt32)
        .field(O + 0x05, "GAMEOBJECT_FLAGS", UInt32)
        .field(O + 0x06, "GAMEOBJECT_PARENTROTATION", Floats { count: 4 })
        .field(O + 0x0A, "GAMEOBJECT_FACTION", UInt32)
        .field(O + 0x0B, "GAMEOBJECT_LEVEL", UInt32)
        .field(O + 0x0C, "GAMEOBJECT_BYTES_1", Bytes)
        .field(O + 0x0D, "GAMEOBJECT_SPELL_VISUAL_ID", UInt32)
        .field(O + 0x0E, "GAMEOBJECT_STATE_SPELL_VISUAL_ID", UInt32)
        .field(O + 0x0F, "GAMEOBJECT_STATE_ANIM_ID", UInt32)
        .field(O + 0x10, "GAMEOBJECT_STATE_ANIM_KIT_ID", UInt32)
        .field(O + 0x11, "GAMEOBJECT_STATE_WORLD_EFFECT_ID", UInts { count: 4 });

    let dynamic_object = TypeLayout::new(ObjectType::DynamicObject)
        .extends(ObjectType::Object)
        .field(O, "DYNAMICOBJECT_CASTER", Guid)
        .field(O + 0x04, "DYNAMICOBJECT_TYPE", Bytes)
        .field(O + 0x05, "DYNAMICOBJECT_SPELLXSPELLVISUALID", UInt32)
        .field(O + 0x06, "DYNAMICOBJECT_SPELLID", UInt32)
        .field(O + 0x07, "DYNAMICOBJECT_RADIUS", Float)
        .field(O + 0x08, "DYNAMICOBJECT_CASTTIME", UInt32);

    let corpse = TypeLayout::new(ObjectType::Corpse)
        .extends(ObjectType::Object)
        .field(O, "CORPSE_FIELD_OWNER", Guid)
        .field(O + 0x04, "CORPSE_FIELD_PARTY", Guid)
        .field(O + 0x08, "CORPSE_FIELD_DISPLAY_ID", UInt32)
        .field(O + 0x09, "CORPSE_FIELD_ITEM", UInts { count: 19 })
        .field(O + 0x1C, "CORPSE_FIELD_SKIN_ID", Bytes)
        .field(O + 0x1D, "CORPSE_FIELD_FACIAL_HAIR_STYLE_ID", Bytes)
        .field(O + 0x1E, "CORPSE_FIELD_FLAGS", UInt32)
        .field(O + 0x1F, "CORPSE_FIELD_DYNAMIC_FLAGS", UInt32)
        .field(O + 0x20, "CORPSE_FIELD_FACTION_TEMPLATE", UInt32);

    let area_trigger = TypeLayout::new(ObjectType::AreaTrigger)
        .extends(ObjectType::Object)
        .field(O, "AREATRIGGER_CASTER", Guid)
        .field(O + 0x04, "AREATRIGGER_DURATION", UInt32)
        .field(O + 0x05, "AREATRIGGER_SPELLID", UInt32)
        .field(O + 0x06, "AREATRIGGER_SPELLVISUALID", UInt32)
        .field(O + 0x07, "AREATRIGGER_EXPLICIT_SCALE", Float);

    let scene_object = TypeLayout::new(ObjectType::SceneObject)
        .extends(ObjectType::Object)
        .field(O, "SCENEOBJECT_FIELD_SCRIPT_PACKAGE_ID", UInt32)
        .field(O + 0x01, "SCENEOBJECT_FIELD_RND_SEED_VAL", UInt32)
        .field(O + 0x02, "SCENEOBJECT_FIELD_CREATEDBY", Guid)
        .field(O + 0x06, "SCENEOBJECT_FIELD_SCENE_TYPE", UInt32);

    SchemaTable {
        name: "6.0.2".to_owned(),
        layouts: vec![
            object,
            item,
            container,
            unit,
            player,
            game_object,
            dynamic_object,
            corpse,
            area_trigger,
            scene_object,
        ],
    }
}
