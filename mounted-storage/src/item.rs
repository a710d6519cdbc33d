//! Item enumeration and item stack value type.


/// Number of item ids known to the registry, any id above resolves to an undefined item.
const ITEMS_LEN: usize = 512;

/// Internal macro to easily define items registry.
macro_rules! items {
    (
        $($name:ident / $id:literal : $init:expr),* $(,)?
    ) => {

        static ITEMS: [Item; ITEMS_LEN] = {
            let mut arr = [Item::new("undefined"); ITEMS_LEN];
            $(arr[$id as usize] = $init;)*
            arr
        };

        $(pub const $name: u16 = $id;)*

    };
}

items! {
    AIR/0:              Item::new("air"),
    STONE/1:            Item::new("stone"),
    GRASS/2:            Item::new("grass"),
    DIRT/3:             Item::new("dirt"),
    COBBLESTONE/4:      Item::new("cobblestone"),
    WOOD/5:             Item::new("wood"),
    SAND/12:            Item::new("sand"),
    GRAVEL/13:          Item::new("gravel"),
    LOG/17:             Item::new("log"),
    WOOL/35:            Item::new("wool"),
    CHEST/54:           Item::new("chest"),
    IRON_SHOVEL/256:    Item::new("iron_shovel").with_max_stack_size(1),
    IRON_PICKAXE/257:   Item::new("iron_pickaxe").with_max_stack_size(1),
    IRON_AXE/258:       Item::new("iron_axe").with_max_stack_size(1),
    FLINT_AND_STEEL/259: Item::new("flint_and_steel").with_max_stack_size(1),
    APPLE/260:          Item::new("apple"),
    BOW/261:            Item::new("bow").with_max_stack_size(1),
    ARROW/262:          Item::new("arrow"),
    COAL/263:           Item::new("coal"),
    DIAMOND/264:        Item::new("diamond"),
    IRON_INGOT/265:     Item::new("iron_ingot"),
    GOLD_INGOT/266:     Item::new("gold_ingot"),
    STICK/280:          Item::new("stick"),
    SIGN/323:           Item::new("sign").with_max_stack_size(1),
    BUCKET/325:         Item::new("bucket").with_max_stack_size(1),
    SNOWBALL/332:       Item::new("snowball").with_max_stack_size(16),
    EGG/344:            Item::new("egg").with_max_stack_size(16),
    DYE/351:            Item::new("dye"),
}


/// Get an item from its numeric id.
pub fn from_id(id: u16) -> &'static Item {
    ITEMS.get(id as usize).unwrap_or(&ITEMS[ITEMS_LEN - 1])
}


/// This structure describe an item.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    /// The name of the item, used for debug purpose.
    pub name: &'static str,
    /// Maximum stack size for this item.
    pub max_stack_size: u16,
}

impl Item {

    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            max_stack_size: 64,
        }
    }

    pub const fn with_max_stack_size(mut self, max_stack_size: u16) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

}


/// An item stack defines the actual number of items and their damage value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemStack {
    /// The item id.
    pub id: u16,
    /// The stack size.
    pub size: u16,
    /// The damage value of the stack, this is also used as the item variant.
    pub damage: u16,
}

impl ItemStack {

    pub const EMPTY: Self = Self { id: AIR, size: 0, damage: 0 };

    /// Create a stack of a single item with no damage.
    pub const fn new(id: u16) -> Self {
        Self { id, size: 1, damage: 0 }
    }

    /// Return a copy of this stack with the given size, the size is not checked against
    /// the maximum stack size of the item.
    pub const fn with_size(mut self, size: u16) -> ItemStack {
        self.size = size;
        self
    }

    pub const fn with_damage(mut self, damage: u16) -> ItemStack {
        self.damage = damage;
        self
    }

    /// Return true if this item stack is air, which is a special case where the item
    /// stack represent an empty slot.
    pub fn is_empty(self) -> bool {
        self.id == AIR || self.size == 0
    }

    /// Simplify this item stack by converting it into `None` if empty.
    pub fn to_non_empty(self) -> Option<ItemStack> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Get the registry item of this stack.
    #[inline]
    pub fn item(self) -> &'static Item {
        from_id(self.id)
    }

    /// Maximum number of items a single stack of this item can hold.
    #[inline]
    pub fn max_stack_size(self) -> u16 {
        self.item().max_stack_size
    }

    /// Increase the size of this stack by the given amount, saturating.
    pub fn grow(&mut self, amount: u16) {
        self.size = self.size.saturating_add(amount);
    }

    /// Remove up to `amount` items from this stack and return them as a new stack.
    pub fn split(&mut self, amount: u16) -> ItemStack {
        let taken = amount.min(self.size);
        self.size -= taken;
        self.with_size(taken)
    }

    /// Return true if both stacks are non empty and hold the same item with the same
    /// damage, meaning that they can be merged into a single stack.
    pub fn can_stack_with(self, other: ItemStack) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.id == other.id
            && self.damage == other.damage
    }

}
