//! Netlist interface and an in-memory reference netlist.
//!
//! [`PlacedNetlist`] is what the engine reads: net membership, pin offsets, and
//! the current location of every block. [`Netlist`] is a concrete, serde
//! (de)serializable implementation used by tests and the command-line harness.

use crate::ids::{BlockId, NetId, PinId};
use crate::moves::MoveRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Location of a placed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockLoc {
    /// Grid column.
    pub x: i32,
    /// Grid row.
    pub y: i32,
    /// Slot within the tile.
    pub sub_tile: i32,
    /// Die layer.
    pub layer: i32,
}

impl BlockLoc {
    /// Creates a location on sub-tile 0.
    pub fn new(x: i32, y: i32, layer: i32) -> Self {
        Self {
            x,
            y,
            sub_tile: 0,
            layer,
        }
    }
}

/// Physical location of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PinLoc {
    /// Grid column.
    pub x: i32,
    /// Grid row.
    pub y: i32,
    /// Die layer.
    pub layer: i32,
}

impl PinLoc {
    /// Location of a pin at `offset` from a block placed at `loc`.
    pub fn at_offset(loc: BlockLoc, offset: (i32, i32)) -> Self {
        Self {
            x: loc.x + offset.0,
            y: loc.y + offset.1,
            layer: loc.layer,
        }
    }
}

/// Whether a pin drives its net or is driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// The net's single driver.
    Driver,
    /// One of the net's sinks.
    Sink,
}

/// Read access to a placed netlist.
pub trait PlacedNetlist {
    /// Number of nets.
    fn net_count(&self) -> usize;
    /// The driver pin of `net`.
    fn net_driver(&self, net: NetId) -> PinId;
    /// The sink pins of `net`. Order defines each sink's connection index.
    fn net_sinks(&self, net: NetId) -> &[PinId];
    /// Whether `net` is excluded from cost (global and clock nets).
    fn net_is_ignored(&self, net: NetId) -> bool;
    /// The block owning `pin`.
    fn pin_block(&self, pin: PinId) -> BlockId;
    /// The net `pin` is connected to, if any.
    fn pin_net(&self, pin: PinId) -> Option<NetId>;
    /// Direction of `pin` on its net.
    fn pin_direction(&self, pin: PinId) -> PinDirection;
    /// Offset of `pin` from its block's anchor.
    fn pin_offset(&self, pin: PinId) -> (i32, i32);
    /// Position of a sink pin within its net's sink list.
    fn pin_sink_index(&self, pin: PinId) -> Option<usize>;
    /// Pins of `block`.
    fn block_pins(&self, block: BlockId) -> &[PinId];
    /// Current location of `block`.
    fn block_loc(&self, block: BlockId) -> BlockLoc;

    /// Current location of `pin`.
    fn pin_loc(&self, pin: PinId) -> PinLoc {
        PinLoc::at_offset(self.block_loc(self.pin_block(pin)), self.pin_offset(pin))
    }
}

/// A placed block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique block ID.
    pub id: BlockId,
    /// Instance name.
    pub name: String,
    /// Current location.
    pub loc: BlockLoc,
    /// Pins on this block.
    pub pins: Vec<PinId>,
}

/// A net with one driver and any number of sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    /// Unique net ID.
    pub id: NetId,
    /// Net name.
    pub name: String,
    /// Driver pin, set by [`Netlist::connect_driver`].
    pub driver: Option<PinId>,
    /// Sink pins.
    pub sinks: Vec<PinId>,
    /// Excluded from cost.
    #[serde(default)]
    pub ignored: bool,
}

/// A block pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Unique pin ID.
    pub id: PinId,
    /// Owning block.
    pub block: BlockId,
    /// Connected net.
    pub net: Option<NetId>,
    /// Direction on the net.
    pub direction: PinDirection,
    /// Offset from the block anchor.
    #[serde(default)]
    pub offset: (i32, i32),
    /// Position in the net's sink list, for sinks.
    #[serde(default)]
    pub sink_index: Option<usize>,
}

/// In-memory placed netlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// All blocks.
    pub blocks: Vec<Block>,
    /// All nets.
    pub nets: Vec<Net>,
    /// All pins.
    pub pins: Vec<Pin>,
    /// Block name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub block_by_name: HashMap<String, BlockId>,
    /// Net name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub net_by_name: HashMap<String, NetId>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block at `loc` and returns its ID.
    pub fn add_block(&mut self, name: impl Into<String>, loc: BlockLoc) -> BlockId {
        let id = BlockId::from_raw(self.blocks.len() as u32);
        let name = name.into();
        self.block_by_name.insert(name.clone(), id);
        self.blocks.push(Block {
            id,
            name,
            loc,
            pins: Vec::new(),
        });
        id
    }

    /// Adds an unconnected net and returns its ID.
    pub fn add_net(&mut self, name: impl Into<String>) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        let name = name.into();
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Net {
            id,
            name,
            driver: None,
            sinks: Vec::new(),
            ignored: false,
        });
        id
    }

    /// Marks `net` as ignored by the cost engine.
    pub fn set_ignored(&mut self, net: NetId, ignored: bool) {
        self.nets[net.index()].ignored = ignored;
    }

    /// Adds a pin on `block` that drives `net`.
    ///
    /// # Panics
    ///
    /// Panics if `net` already has a driver.
    pub fn connect_driver(&mut self, net: NetId, block: BlockId, offset: (i32, i32)) -> PinId {
        assert!(
            self.nets[net.index()].driver.is_none(),
            "net {} already has a driver",
            self.nets[net.index()].name
        );
        let pin = self.push_pin(block, Some(net), PinDirection::Driver, offset, None);
        self.nets[net.index()].driver = Some(pin);
        pin
    }

    /// Adds a pin on `block` that is a sink of `net`.
    pub fn connect_sink(&mut self, net: NetId, block: BlockId, offset: (i32, i32)) -> PinId {
        let sink_index = self.nets[net.index()].sinks.len();
        let pin = self.push_pin(block, Some(net), PinDirection::Sink, offset, Some(sink_index));
        self.nets[net.index()].sinks.push(pin);
        pin
    }

    /// Adds a pin on `block` that is not connected to any net.
    pub fn add_open_pin(&mut self, block: BlockId) -> PinId {
        self.push_pin(block, None, PinDirection::Sink, (0, 0), None)
    }

    fn push_pin(
        &mut self,
        block: BlockId,
        net: Option<NetId>,
        direction: PinDirection,
        offset: (i32, i32),
        sink_index: Option<usize>,
    ) -> PinId {
        let id = PinId::from_raw(self.pins.len() as u32);
        self.pins.push(Pin {
            id,
            block,
            net,
            direction,
            offset,
            sink_index,
        });
        self.blocks[block.index()].pins.push(id);
        id
    }

    /// Returns the block with the given ID.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.index()]
    }

    /// Returns the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Relocates `block`.
    pub fn set_block_loc(&mut self, block: BlockId, loc: BlockLoc) {
        self.blocks[block.index()].loc = loc;
    }

    /// Moves every block in `mv` to its proposed location.
    pub fn apply_move(&mut self, mv: &MoveRecord) {
        for moved in mv.blocks() {
            self.set_block_loc(moved.block, moved.to);
        }
    }

    /// Moves every block in `mv` back to its original location.
    pub fn revert_move(&mut self, mv: &MoveRecord) {
        for moved in mv.blocks() {
            self.set_block_loc(moved.block, moved.from);
        }
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.block_by_name.clear();
        for (i, block) in self.blocks.iter().enumerate() {
            self.block_by_name
                .insert(block.name.clone(), BlockId::from_raw(i as u32));
        }
        self.net_by_name.clear();
        for (i, net) in self.nets.iter().enumerate() {
            self.net_by_name
                .insert(net.name.clone(), NetId::from_raw(i as u32));
        }
    }

    /// Checks structural consistency: every net has a driver, and pin, net,
    /// and block references agree with each other.
    pub fn validate(&self) -> Result<(), String> {
        for net in &self.nets {
            let driver = net
                .driver
                .ok_or_else(|| format!("net '{}' has no driver", net.name))?;
            let pin = self
                .pins
                .get(driver.index())
                .ok_or_else(|| format!("net '{}' driver pin {driver} does not exist", net.name))?;
            if pin.net != Some(net.id) || pin.direction != PinDirection::Driver {
                return Err(format!("net '{}' driver pin {driver} is not its driver", net.name));
            }
            for (i, &sink) in net.sinks.iter().enumerate() {
                let pin = self
                    .pins
                    .get(sink.index())
                    .ok_or_else(|| format!("net '{}' sink pin {sink} does not exist", net.name))?;
                if pin.net != Some(net.id) || pin.sink_index != Some(i) {
                    return Err(format!("net '{}' sink pin {sink} is inconsistent", net.name));
                }
            }
        }
        for pin in &self.pins {
            let block = self
                .blocks
                .get(pin.block.index())
                .ok_or_else(|| format!("pin {} refers to missing block {}", pin.id, pin.block))?;
            if !block.pins.contains(&pin.id) {
                return Err(format!("pin {} is not listed on block '{}'", pin.id, block.name));
            }
        }
        Ok(())
    }
}

impl PlacedNetlist for Netlist {
    fn net_count(&self) -> usize {
        self.nets.len()
    }

    fn net_driver(&self, net: NetId) -> PinId {
        match self.nets[net.index()].driver {
            Some(pin) => pin,
            None => panic!("net {} has no driver", self.nets[net.index()].name),
        }
    }

    fn net_sinks(&self, net: NetId) -> &[PinId] {
        &self.nets[net.index()].sinks
    }

    fn net_is_ignored(&self, net: NetId) -> bool {
        self.nets[net.index()].ignored
    }

    fn pin_block(&self, pin: PinId) -> BlockId {
        self.pins[pin.index()].block
    }

    fn pin_net(&self, pin: PinId) -> Option<NetId> {
        self.pins[pin.index()].net
    }

    fn pin_direction(&self, pin: PinId) -> PinDirection {
        self.pins[pin.index()].direction
    }

    fn pin_offset(&self, pin: PinId) -> (i32, i32) {
        self.pins[pin.index()].offset
    }

    fn pin_sink_index(&self, pin: PinId) -> Option<usize> {
        self.pins[pin.index()].sink_index
    }

    fn block_pins(&self, block: BlockId) -> &[PinId] {
        &self.blocks[block.index()].pins
    }

    fn block_loc(&self, block: BlockId) -> BlockLoc {
        self.blocks[block.index()].loc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_block_net() -> (Netlist, NetId, BlockId, BlockId) {
        let mut nl = Netlist::new();
        let a = nl.add_block("a", BlockLoc::new(2, 2, 0));
        let b = nl.add_block("b", BlockLoc::new(5, 3, 0));
        let n = nl.add_net("n");
        nl.connect_driver(n, a, (0, 0));
        nl.connect_sink(n, b, (1, 0));
        (nl, n, a, b)
    }

    #[test]
    fn connect_builds_both_directions() {
        let (nl, n, a, b) = two_block_net();
        let driver = nl.net_driver(n);
        assert_eq!(nl.pin_block(driver), a);
        assert_eq!(nl.pin_direction(driver), PinDirection::Driver);
        let sink = nl.net_sinks(n)[0];
        assert_eq!(nl.pin_block(sink), b);
        assert_eq!(nl.pin_sink_index(sink), Some(0));
        assert_eq!(nl.block_pins(b), &[sink]);
        assert!(nl.validate().is_ok());
    }

    #[test]
    fn pin_loc_adds_offset() {
        let (nl, n, _, _) = two_block_net();
        let sink = nl.net_sinks(n)[0];
        assert_eq!(nl.pin_loc(sink), PinLoc { x: 6, y: 3, layer: 0 });
    }

    #[test]
    fn apply_and_revert_move() {
        let (mut nl, _, a, _) = two_block_net();
        let mut mv = MoveRecord::new();
        mv.push(a, BlockLoc::new(2, 2, 0), BlockLoc::new(4, 4, 0));
        nl.apply_move(&mv);
        assert_eq!(nl.block_loc(a), BlockLoc::new(4, 4, 0));
        nl.revert_move(&mv);
        assert_eq!(nl.block_loc(a), BlockLoc::new(2, 2, 0));
    }

    #[test]
    fn open_pin_has_no_net() {
        let (mut nl, _, a, _) = two_block_net();
        let pin = nl.add_open_pin(a);
        assert_eq!(nl.pin_net(pin), None);
    }

    #[test]
    fn validate_rejects_driverless_net() {
        let (mut nl, _, _, _) = two_block_net();
        nl.add_net("floating");
        assert!(nl.validate().unwrap_err().contains("floating"));
    }

    #[test]
    #[should_panic(expected = "already has a driver")]
    fn second_driver_panics() {
        let (mut nl, n, _, b) = two_block_net();
        nl.connect_driver(n, b, (0, 0));
    }

    #[test]
    fn json_roundtrip_rebuilds_indices() {
        let (nl, n, _, _) = two_block_net();
        let json = serde_json::to_string(&nl).unwrap();
        let mut back: Netlist = serde_json::from_str(&json).unwrap();
        assert!(back.net_by_name.is_empty());
        back.rebuild_indices();
        assert_eq!(back.net_by_name["n"], n);
        assert_eq!(back.block_by_name.len(), 2);
        assert_eq!(back.pins, nl.pins);
    }
}
