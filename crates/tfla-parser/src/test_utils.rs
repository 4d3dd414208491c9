//! Test utilities: Terraform trees on disk

use std::fs;
use tempfile::TempDir;

/// Create a configuration tree from `(relative path, content)` pairs.
pub fn create_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

/// A small multi-environment layout with a shared local module, a registry
/// module, a git module and one resource.
pub fn create_sample_tree() -> TempDir {
    create_tree(&[
        (
            "envs/prod/main.tf",
            r#"
module "network" {
  source = "../../modules/network"
  cidr   = "10.0.0.0/16"
}

module "app" {
  source     = "../../modules/app"
  vpc_id     = module.network.vpc_id
  depends_on = [module.network]
}
"#,
        ),
        (
            "envs/prod/dns.tf",
            r#"
module "dns" {
  source = "git::https://github.com/acme/dns.git//zones?ref=v1.0.0"
  vpc    = module.network.vpc_id
}
"#,
        ),
        (
            "envs/dev/main.tf",
            r#"
module "network" {
  source = "../../modules/network"
}

module "vpc" {
  source  = "terraform-aws-modules/vpc/aws"
  version = "5.0.0"
}

resource "aws_s3_bucket" "logs" {
  bucket     = "dev-logs"
  depends_on = [module.vpc]

  tags {
    env = "dev"
  }
}
"#,
        ),
        (
            "modules/network/main.tf",
            r#"
resource "aws_vpc" "this" {
  cidr_block = var.cidr
}
"#,
        ),
        ("modules/app/main.tf", "# app module\n"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sample_tree() {
        let temp_dir = create_sample_tree();
        let root = temp_dir.path();
        assert!(root.join("envs/prod/main.tf").exists());
        assert!(root.join("modules/network/main.tf").exists());
        assert!(root.join("modules/app").is_dir());
    }
}
