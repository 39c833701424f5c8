//! Shared fixtures for mapconv integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// XML mapping for `crm::Customer`; file name `crm.Customer.entity.xml`.
pub const CUSTOMER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<entity-mapping>
  <entity name="crm::Customer" table="customers" repository="crm::CustomerRepository">
    <id name="id" type="bigint" generator="auto"/>
    <field name="email" type="string" length="120" unique="true"/>
    <field name="note" type="text" nullable="true"/>
    <many-to-one field="address" target="crm::Address" join-column="address_id"/>
    <one-to-many field="orders" target="crm::Order" mapped-by="customer"/>
  </entity>
</entity-mapping>
"#;

/// XML mapping for plain entity `Foo`; file name `Foo.entity.xml`.
pub const FOO_XML: &str = r#"<entity-mapping>
  <entity name="Foo" table="foos">
    <id name="id" type="bigint" generator="auto"/>
  </entity>
</entity-mapping>
"#;

/// XML mapping for mapped superclass `Base`; file name `Base.entity.xml`.
pub const BASE_XML: &str = r#"<entity-mapping>
  <mapped-superclass name="Base">
    <id name="id" type="bigint" generator="auto"/>
  </mapped-superclass>
</entity-mapping>
"#;

/// Annotated struct for entity `Bar`; any `.rs` file at the source root.
pub const BAR_RS: &str = r#"#[entity(table = "bars")]
pub struct Bar {
    #[id]
    #[generated(auto)]
    pub id: i64,
    #[column(length = 80)]
    pub label: String,
}
"#;

/// YAML mapping for `crm::Order`; file name `crm.Order.entity.yaml`.
pub const ORDER_YAML: &str = r#"crm::Order:
  table: orders
  id:
    id:
      type: bigint
      generator: auto
  fields:
    placed_at:
      type: datetime
  many_to_one:
    customer:
      target: crm::Customer
      inversed_by: orders
"#;

/// Isolated working directory plus a builder for CLI invocations inside it.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for the compiled `mapconv` binary rooted in the work
    /// directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("mapconv").expect("Failed to locate mapconv binary");
        cmd.current_dir(&self.work_dir);
        cmd
    }

    /// Create a mapping source directory under the work directory.
    pub fn source_dir(&self, name: &str) -> PathBuf {
        let dir = self.work_dir.join(name);
        fs::create_dir_all(&dir).expect("Failed to create source directory");
        dir
    }
}

/// Write one fixture file and return its path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}
